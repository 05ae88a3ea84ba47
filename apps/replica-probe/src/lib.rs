//! Replica Set Probe
//!
//! A diagnostic loop that keeps checking a MongoDB replica set:
//!
//! ```text
//! loop
//!   ├─ connect (retry every second while an election is going on)
//!   ├─ replSetGetStatus → member states and replication lag
//!   ├─ delete / insert / read back a timestamp in `stackhero-test`
//!   ├─ close
//!   └─ sleep
//! ```
//!
//! A read-back that differs from what was just written is fatal: the
//! process exits non-zero with both values in the error.

pub mod cluster;
pub mod config;
pub mod console;
pub mod error;
pub mod poller;
pub mod probe;
pub mod shutdown;
pub mod topology;

use core_config::Environment;
use eyre::{Result, WrapErr};
use tracing::info;

use cluster::MongoConnector;
use config::{Config, Overrides};
use console::Console;
use poller::Poller;

pub use error::{ProbeError, ProbeResult};

/// Run the probe
///
/// Configuration is loaded and validated before anything touches the
/// network, so a missing node list fails immediately.
///
/// # Errors
///
/// Returns an error if:
/// - required configuration is missing or invalid
/// - the cluster answers a status or probe command with an error
/// - the probe reads back something other than what it wrote
pub async fn run(overrides: Overrides) -> Result<()> {
    core_config::tracing::init_tracing(&Environment::from_env());

    let config = Config::from_env()
        .wrap_err("Failed to load configuration")?
        .with_overrides(overrides);

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting replica probe"
    );

    let mut shutdown_rx = shutdown::spawn_shutdown_listener();

    let console = Console::new(std::io::stdout()).with_clear_screen(config.poll.clear_screen);
    let mut poller = Poller::new(MongoConnector, config, console);

    poller
        .run(&mut shutdown_rx)
        .await
        .wrap_err("Replica set probe failed")?;

    Ok(())
}
