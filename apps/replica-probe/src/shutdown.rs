use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Wait for a shutdown signal (SIGINT or SIGTERM)
pub async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, stopping probe...");
            },
            _ = terminate.recv() => {
                info!("Received SIGTERM, stopping probe...");
            },
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, stopping probe...");
    }

    Ok(())
}

/// Spawn the signal listener and return the flag it sets.
///
/// If the handlers cannot be installed the sender is dropped, the flag
/// never changes, and the process is left to default signal handling.
pub fn spawn_shutdown_listener() -> watch::Receiver<bool> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Failed to install shutdown signal handlers"),
        }
    });

    shutdown_rx
}
