use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Retry configuration for database connections
///
/// Attempts repeat forever with the same delay in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay between two attempts in milliseconds
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn fixed_interval(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Retry an async operation until it succeeds or shutdown is requested.
///
/// `on_failure` is invoked with the error and the attempt number after
/// every failed attempt. Every failure is logged at `warn`.
///
/// Returns `None` when `shutdown` flips to `true` before a successful
/// attempt, either while the operation is in flight or while waiting for
/// the next attempt.
pub async fn retry_until_shutdown<F, Fut, T, E, R>(
    mut operation: F,
    mut on_failure: R,
    config: &RetryConfig,
    shutdown: &mut watch::Receiver<bool>,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: FnMut(&E, u32),
{
    let mut attempt = 0;

    loop {
        if *shutdown.borrow() {
            return None;
        }

        let result = tokio::select! {
            _ = wait_for_shutdown(shutdown) => return None,
            result = operation() => result,
        };

        match result {
            Ok(value) => {
                if attempt > 0 {
                    info!(retries = attempt, "Operation succeeded after retries");
                }
                return Some(value);
            }
            Err(e) => {
                attempt += 1;
                warn!(
                    attempt = attempt,
                    error = %e,
                    retry_in_ms = config.delay_ms,
                    "Operation failed, retrying"
                );
                on_failure(&e, attempt);

                tokio::select! {
                    _ = wait_for_shutdown(shutdown) => return None,
                    _ = tokio::time::sleep(config.delay()) => {}
                }
            }
        }
    }
}

/// Resolve once the shutdown flag is `true`.
///
/// If every sender is gone the flag can never change, so this pends forever.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
