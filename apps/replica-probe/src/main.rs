//! Replica Probe - Entry Point

use clap::Parser;
use core_config::tracing::install_color_eyre;
use replica_probe::config::Overrides;

#[derive(Parser)]
#[command(name = "replica-probe")]
#[command(about = "Check MongoDB replica set health and write/read consistency in a loop")]
struct Cli {
    /// Run a single iteration and exit
    #[arg(long)]
    once: bool,

    /// Pause between iterations in milliseconds (overrides PROBE_INTERVAL_MS)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Pause between connection attempts in milliseconds (overrides PROBE_RETRY_DELAY_MS)
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Do not clear the terminal before each iteration
    #[arg(long)]
    no_clear: bool,
}

impl From<Cli> for Overrides {
    fn from(cli: Cli) -> Self {
        Self {
            once: cli.once,
            interval_ms: cli.interval_ms,
            retry_delay_ms: cli.retry_delay_ms,
            no_clear: cli.no_clear,
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    replica_probe::run(cli.into()).await
}
