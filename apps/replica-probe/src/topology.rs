//! Replica set topology report

use std::io::Write;

use database::mongodb::{MemberStatus, ReplicaStatus};
use tracing::{debug, warn};

use crate::cluster::ClusterSession;
use crate::console::Console;
use crate::error::ProbeResult;

/// One report line for `member`, with lag when it can be computed
pub fn describe_member(status: &ReplicaStatus, member: &MemberStatus) -> String {
    match status.lag_behind_primary(member) {
        Some(lag) => format!(
            " - {}, state is {}, {} second(s) behind the primary",
            member.name, member.state, lag
        ),
        None => format!(" - {}, state is {}", member.name, member.state),
    }
}

/// Fetch `replSetGetStatus` and print the set name and every member
pub async fn report_topology<W: Write, E: Write>(
    session: &dyn ClusterSession,
    console: &mut Console<W, E>,
) -> ProbeResult<ReplicaStatus> {
    console.line("Getting replica set status...")?;
    let status = session.replica_status().await?;
    console.blank()?;

    console.line(format!("Replica set name: {}", status.set))?;
    console.blank()?;

    if status.primary().is_none() {
        warn!(set = %status.set, "Replica set has no primary, lag is not reported");
    }

    console.line("Replica set members:")?;
    for member in &status.members {
        debug!(
            member = %member.name,
            state = %member.state,
            lag_secs = ?status.lag_behind_primary(member),
            "Member status"
        );
        console.line(describe_member(&status, member))?;
    }
    console.blank()?;

    Ok(status)
}
