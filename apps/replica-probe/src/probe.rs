//! Write-then-read consistency probe
//!
//! Every run wipes the probe collection, inserts one timestamped document
//! and reads it straight back. If the read returns anything other than what
//! was written, the cluster served stale data and the run is fatal.

use std::io::Write;

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::ClusterSession;
use crate::console::Console;
use crate::error::{ProbeError, ProbeResult};

/// Collection the probe owns; its contents are discarded on every run
pub const PROBE_COLLECTION: &str = "stackhero-test";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub date: DateTime,
}

impl ProbeRecord {
    pub fn now() -> Self {
        Self {
            date: DateTime::now(),
        }
    }

    /// RFC 3339 form used for the read-back comparison
    pub fn canonical(&self) -> String {
        self.date
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| format!("{}ms since epoch", self.date.timestamp_millis()))
    }
}

/// Compare what was written with what came back, by canonical text
pub fn verify_round_trip(written: &ProbeRecord, read: &ProbeRecord) -> ProbeResult<()> {
    let written = written.canonical();
    let read = read.canonical();

    if written == read {
        Ok(())
    } else {
        Err(ProbeError::Mismatch { written, read })
    }
}

/// Run the delete/insert/read-back sequence against `database`
///
/// Returns the record that was read back.
pub async fn run_probe<W: Write, E: Write>(
    session: &dyn ClusterSession,
    database: &str,
    console: &mut Console<W, E>,
) -> ProbeResult<ProbeRecord> {
    // Selecting a database is only a handle on the driver side
    console.line(format!("Selecting database {}...", database))?;
    console.line(" ✅ Select OK")?;
    console.blank()?;

    console.line(format!("Removing entries from collection {}", PROBE_COLLECTION))?;
    let removed = session.clear_probes(database).await?;
    debug!(database, removed, "Cleared probe collection");
    console.line(" ✅ Delete OK")?;
    console.blank()?;

    console.line("Inserting test datas")?;
    let written = ProbeRecord::now();
    session.insert_probe(database, written.clone()).await?;
    console.line(" ✅ Insert OK")?;
    console.blank()?;

    console.line("Checking inserted datas")?;
    let read = session
        .first_probe(database)
        .await?
        .ok_or_else(|| ProbeError::Missing {
            collection: PROBE_COLLECTION.to_string(),
        })?;
    verify_round_trip(&written, &read)?;
    console.line(" ✅ Test datas are OK")?;
    console.blank()?;

    Ok(read)
}
