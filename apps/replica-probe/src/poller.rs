//! The outer poll loop.
//!
//! One iteration: connect (retrying forever through elections), report the
//! replica set topology, run the consistency probe, close the connection.
//! Iterations repeat until shutdown is requested or a fatal error occurs.
//! Every network wait is raced against the shutdown flag.

use std::io::Write;
use std::time::Duration;

use database::DatabaseError;
use database::common::{RetryConfig, retry_until_shutdown, wait_for_shutdown};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cluster::{ClusterConnector, ClusterSession};
use crate::config::Config;
use crate::console::Console;
use crate::error::ProbeResult;
use crate::probe::run_probe;
use crate::topology::report_topology;

/// How an iteration ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    Completed,
    /// Shutdown was requested before the iteration could finish
    Cancelled,
}

pub struct Poller<C, W: Write, E: Write> {
    connector: C,
    config: Config,
    retry: RetryConfig,
    console: Console<W, E>,
}

impl<C, W, E> Poller<C, W, E>
where
    C: ClusterConnector,
    W: Write,
    E: Write,
{
    pub fn new(connector: C, config: Config, console: Console<W, E>) -> Self {
        let retry = config.poll.retry_config();
        Self {
            connector,
            config,
            retry,
            console,
        }
    }

    pub fn into_console(self) -> Console<W, E> {
        self.console
    }

    /// Run iterations until shutdown, a fatal error, or (with `once`) the
    /// first completed iteration.
    pub async fn run(&mut self, shutdown: &mut watch::Receiver<bool>) -> ProbeResult<()> {
        info!(
            nodes = %self.config.cluster.hosts(),
            replica_set = %self.config.cluster.replica_set,
            database = %self.config.cluster.database,
            interval_ms = self.config.poll.interval_ms,
            "Starting replica set probe"
        );

        let mut completed: u64 = 0;
        loop {
            match self.run_iteration(shutdown).await? {
                Iteration::Cancelled => break,
                Iteration::Completed => {
                    completed += 1;
                    debug!(iteration = completed, "Iteration completed");
                    if self.config.poll.once {
                        break;
                    }
                }
            }

            tokio::select! {
                _ = wait_for_shutdown(shutdown) => break,
                _ = tokio::time::sleep(self.config.poll.interval()) => {}
            }
        }

        info!(iterations = completed, "Replica set probe stopped");
        Ok(())
    }

    /// One connect / report / probe / close cycle.
    ///
    /// The connection is closed whether the report and probe succeed, fail,
    /// or are abandoned because shutdown was requested.
    pub async fn run_iteration(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ProbeResult<Iteration> {
        self.console.clear()?;

        let Some(session) = self.connect(shutdown).await? else {
            info!("Shutdown requested while connecting");
            return Ok(Iteration::Cancelled);
        };

        let result = tokio::select! {
            biased;
            _ = wait_for_shutdown(shutdown) => None,
            result = self.inspect(session.as_ref()) => Some(result),
        };
        session.close().await;

        match result {
            Some(result) => result.map(|_| Iteration::Completed),
            None => {
                info!("Shutdown requested while inspecting the replica set");
                Ok(Iteration::Cancelled)
            }
        }
    }

    async fn connect(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ProbeResult<Option<Box<dyn ClusterSession>>> {
        let connector = &self.connector;
        let cluster = &self.config.cluster;
        let interval = self.config.poll.interval();
        let console = &mut self.console;

        announce_attempt(console, interval)?;

        let session = retry_until_shutdown(
            || connector.connect(cluster),
            |err, attempt| {
                if let Err(e) = report_failed_attempt(console, err, interval) {
                    debug!(attempt, error = %e, "Failed to report connection failure");
                }
            },
            &self.retry,
            shutdown,
        )
        .await;

        if session.is_some() {
            console.blank()?;
        }
        Ok(session)
    }

    async fn inspect(&mut self, session: &dyn ClusterSession) -> ProbeResult<()> {
        report_topology(session, &mut self.console).await?;
        run_probe(session, &self.config.cluster.database, &mut self.console).await?;
        Ok(())
    }
}

fn announce_attempt<W: Write, E: Write>(
    console: &mut Console<W, E>,
    interval: Duration,
) -> std::io::Result<()> {
    console.line(format!(
        "Note: this probe runs every {:?} to check your replica set status",
        interval
    ))?;
    console.line("Connecting to MongoDB nodes...")
}

fn report_failed_attempt<W: Write, E: Write>(
    console: &mut Console<W, E>,
    err: &DatabaseError,
    interval: Duration,
) -> std::io::Result<()> {
    console.warn("The connection to MongoDB has failed. Maybe it is because an election is going.")?;
    console.warn(err.to_string())?;
    console.blank()?;
    announce_attempt(console, interval)
}
