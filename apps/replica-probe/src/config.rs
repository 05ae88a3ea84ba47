use core_config::{ConfigError, Environment, FromEnv, env_bool, env_parse};
use database::common::RetryConfig;
use database::mongodb::ReplicaSetConfig;
use std::time::Duration;

/// Application name reported to the server when none is configured
pub const APP_NAME: &str = "replica-probe";

/// Poll loop timing and presentation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between two successful iterations
    pub interval_ms: u64,

    /// Pause between two failed connection attempts
    pub retry_delay_ms: u64,

    /// Reset the terminal at the start of each iteration
    pub clear_screen: bool,

    /// Stop after the first successful iteration
    pub once: bool,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Connection retries never give up and never back off
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed_interval(self.retry_delay_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            retry_delay_ms: 1000,
            clear_screen: true,
            once: false,
        }
    }
}

impl FromEnv for PollConfig {
    /// Reads from environment variables with defaults:
    /// - PROBE_INTERVAL_MS: 1000
    /// - PROBE_RETRY_DELAY_MS: 1000
    /// - PROBE_CLEAR_SCREEN: true
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            interval_ms: env_parse("PROBE_INTERVAL_MS", defaults.interval_ms)?,
            retry_delay_ms: env_parse("PROBE_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            clear_screen: env_bool("PROBE_CLEAR_SCREEN", defaults.clear_screen)?,
            once: defaults.once,
        })
    }
}

/// Command-line overrides applied on top of the environment
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub once: bool,
    pub interval_ms: Option<u64>,
    pub retry_delay_ms: Option<u64>,
    pub no_clear: bool,
}

/// Application configuration, built once at startup and never mutated
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub cluster: ReplicaSetConfig,
    pub poll: PollConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let mut cluster = ReplicaSetConfig::from_env()?;
        if cluster.app_name.is_none() {
            cluster = cluster.with_app_name(APP_NAME);
        }
        let poll = PollConfig::from_env()?;

        Ok(Self {
            environment,
            cluster,
            poll,
        })
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.once {
            self.poll.once = true;
        }
        if let Some(interval_ms) = overrides.interval_ms {
            self.poll.interval_ms = interval_ms;
        }
        if let Some(retry_delay_ms) = overrides.retry_delay_ms {
            self.poll.retry_delay_ms = retry_delay_ms;
        }
        if overrides.no_clear {
            self.poll.clear_screen = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cluster_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(
            [
                ("MONGODB_NODES", Some("node-1.example.com,node-2.example.com")),
                ("MONGODB_PASSWORD", Some("secret")),
                ("MONGODB_REPLICA_NAME", Some("rs0")),
                ("MONGODB_APP_NAME", None),
                ("PROBE_INTERVAL_MS", None),
                ("PROBE_RETRY_DELAY_MS", None),
                ("PROBE_CLEAR_SCREEN", None),
            ],
            f,
        );
    }

    #[test]
    fn test_config_from_env_with_defaults() {
        with_cluster_env(|| {
            let config = Config::from_env().unwrap();
            assert_eq!(config.cluster.nodes.len(), 2);
            assert_eq!(config.cluster.app_name.as_deref(), Some(APP_NAME));
            assert_eq!(config.poll, PollConfig::default());
            assert_eq!(config.poll.interval(), Duration::from_secs(1));
        });
    }

    #[test]
    fn test_config_requires_nodes() {
        temp_env::with_vars(
            [
                ("MONGODB_NODES", None::<&str>),
                ("MONGODB_PASSWORD", Some("secret")),
                ("MONGODB_REPLICA_NAME", Some("rs0")),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "MONGODB_NODES"));
            },
        );
    }

    #[test]
    fn test_config_requires_replica_set_name() {
        temp_env::with_vars(
            [
                ("MONGODB_NODES", Some("node-1.example.com")),
                ("MONGODB_PASSWORD", Some("secret")),
                ("MONGODB_REPLICA_NAME", None),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_REPLICA_NAME"));
            },
        );
    }

    #[test]
    fn test_poll_config_from_env() {
        temp_env::with_vars(
            [
                ("PROBE_INTERVAL_MS", Some("5000")),
                ("PROBE_RETRY_DELAY_MS", Some("250")),
                ("PROBE_CLEAR_SCREEN", Some("false")),
            ],
            || {
                let poll = PollConfig::from_env().unwrap();
                assert_eq!(poll.interval_ms, 5000);
                assert_eq!(poll.retry_delay_ms, 250);
                assert!(!poll.clear_screen);
                assert!(!poll.once);
                assert_eq!(poll.retry_config(), RetryConfig::fixed_interval(250));
            },
        );
    }

    #[test]
    fn test_poll_config_rejects_bad_interval() {
        temp_env::with_var("PROBE_INTERVAL_MS", Some("often"), || {
            let err = PollConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PROBE_INTERVAL_MS"));
        });
    }

    #[test]
    fn test_overrides_take_precedence() {
        with_cluster_env(|| {
            let config = Config::from_env().unwrap().with_overrides(Overrides {
                once: true,
                interval_ms: Some(10_000),
                retry_delay_ms: None,
                no_clear: true,
            });

            assert!(config.poll.once);
            assert_eq!(config.poll.interval_ms, 10_000);
            assert_eq!(config.poll.retry_delay_ms, 1000);
            assert!(!config.poll.clear_screen);
        });
    }
}
