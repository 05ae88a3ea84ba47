pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment (dev = terminal output, prod = log shipping)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load and parse environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load and parse environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Load a required comma-separated list.
///
/// Entries are trimmed and empty entries dropped. A variable that is set
/// but contains no entries is treated as missing.
pub fn env_list(key: &str) -> Result<Vec<String>, ConfigError> {
    let raw = env_required(key)?;
    let items: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        return Err(ConfigError::MissingEnvVar(key.to_string()));
    }

    Ok(items)
}

/// Parse an optional environment variable, falling back to `default` when unset
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse an optional boolean flag.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` (case-insensitive).
pub fn env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("'{}' is not a boolean", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("TEST_VAR", Some("test_value"), || {
            assert_eq!(env_or_default("TEST_VAR", "default"), "test_value");
        });

        temp_env::with_var_unset("MISSING_VAR", || {
            assert_eq!(env_or_default("MISSING_VAR", "default_value"), "default_value");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("MISSING_REQUIRED", || {
            let err = env_required("MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_list_trims_and_drops_empty_entries() {
        temp_env::with_var("NODES", Some(" a.example.com, b.example.com,,c.example.com "), || {
            let nodes = env_list("NODES").unwrap();
            assert_eq!(nodes, vec!["a.example.com", "b.example.com", "c.example.com"]);
        });
    }

    #[test]
    fn test_env_list_blank_is_missing() {
        temp_env::with_var("NODES", Some(" , "), || {
            let err = env_list("NODES").unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "NODES"));
        });
    }

    #[test]
    fn test_env_parse() {
        temp_env::with_var("INTERVAL", Some("250"), || {
            assert_eq!(env_parse::<u64>("INTERVAL", 1000).unwrap(), 250);
        });

        temp_env::with_var_unset("INTERVAL", || {
            assert_eq!(env_parse::<u64>("INTERVAL", 1000).unwrap(), 1000);
        });

        temp_env::with_var("INTERVAL", Some("soon"), || {
            let err = env_parse::<u64>("INTERVAL", 1000).unwrap_err();
            assert!(err.to_string().contains("INTERVAL"));
        });
    }

    #[test]
    fn test_env_bool() {
        temp_env::with_var("FLAG", Some("No"), || {
            assert!(!env_bool("FLAG", true).unwrap());
        });

        temp_env::with_var("FLAG", Some("1"), || {
            assert!(env_bool("FLAG", false).unwrap());
        });

        temp_env::with_var_unset("FLAG", || {
            assert!(env_bool("FLAG", true).unwrap());
        });

        temp_env::with_var("FLAG", Some("maybe"), || {
            assert!(env_bool("FLAG", true).is_err());
        });
    }
}
