use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_bool, env_list, env_or_default, env_required};

/// Port used when a node is listed without one
pub const DEFAULT_PORT: u16 = 27017;

/// Default user for managed replica sets
pub const DEFAULT_USERNAME: &str = "admin";

/// Default database used by the consistency probe
pub const DEFAULT_DATABASE: &str = "stackhero-tests";

/// A single replica set member address (`host[:port]`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for NodeAddress {
    type Err = String;

    /// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty node address".to_string());
        }

        // Bracketed IPv6 literal
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| format!("unterminated IPv6 literal in '{}'", s))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port, s)?,
                None if tail.is_empty() => DEFAULT_PORT,
                None => return Err(format!("unexpected characters after ']' in '{}'", s)),
            };
            return Ok(Self::new(format!("[{}]", host), port));
        }

        match s.split_once(':') {
            Some((host, port)) if !port.contains(':') => {
                if host.is_empty() {
                    return Err(format!("missing host in '{}'", s));
                }
                Ok(Self::new(host, parse_port(port, s)?))
            }
            // Bare IPv6 without brackets cannot carry a port
            Some(_) => Ok(Self::new(format!("[{}]", s), DEFAULT_PORT)),
            None => Ok(Self::new(s, DEFAULT_PORT)),
        }
    }
}

fn parse_port(port: &str, input: &str) -> Result<u16, String> {
    port.parse()
        .map_err(|_| format!("invalid port '{}' in '{}'", port, input))
}

/// MongoDB replica set connection settings
///
/// Immutable once built. Construct it manually with the builder methods or
/// load it from the environment (with the `config` feature).
///
/// # Example
///
/// ```ignore
/// use database::mongodb::{NodeAddress, ReplicaSetConfig};
///
/// let config = ReplicaSetConfig::new(
///     vec![NodeAddress::new("node-1.example.com", 27017)],
///     "rs0",
/// )
/// .with_credentials("admin", "secret")
/// .with_database("probe");
///
/// // From environment variables (requires `config` feature)
/// let config = ReplicaSetConfig::from_env()?;
/// ```
#[derive(Clone)]
pub struct ReplicaSetConfig {
    /// Seed list, in the order given by the operator
    pub nodes: Vec<NodeAddress>,

    pub username: String,

    pub password: String,

    /// Replica set name (`replicaSet` URI option)
    pub replica_set: String,

    /// Database the probe writes into
    pub database: String,

    /// Connect over TLS
    pub tls: bool,

    /// Validate server certificates (only meaningful with `tls`)
    pub tls_validate: bool,

    /// Optional application name for server logs
    pub app_name: Option<String>,
}

impl ReplicaSetConfig {
    pub fn new(nodes: Vec<NodeAddress>, replica_set: impl Into<String>) -> Self {
        Self {
            nodes,
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            replica_set: replica_set.into(),
            database: DEFAULT_DATABASE.to_string(),
            tls: true,
            tls_validate: true,
            app_name: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Disabling validation is for debugging only
    pub fn with_tls_validation(mut self, validate: bool) -> Self {
        self.tls_validate = validate;
        self
    }

    /// Set the application name for server logs
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Get the database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Comma-joined `host:port` list, as it appears in the connection string
    pub fn hosts(&self) -> String {
        self.nodes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Debug for ReplicaSetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaSetConfig")
            .field("nodes", &self.hosts())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("replica_set", &self.replica_set)
            .field("database", &self.database)
            .field("tls", &self.tls)
            .field("tls_validate", &self.tls_validate)
            .field("app_name", &self.app_name)
            .finish()
    }
}

/// Load ReplicaSetConfig from environment variables
///
/// Environment variables:
/// - `MONGODB_NODES` (required) - comma-separated `host[:port]` list
/// - `MONGODB_PASSWORD` (required)
/// - `MONGODB_REPLICA_NAME` (required)
/// - `MONGODB_USERNAME` (optional, default: admin)
/// - `MONGODB_DATABASE` (optional, default: stackhero-tests)
/// - `MONGODB_TLS` (optional, default: true)
/// - `MONGODB_TLS_VALIDATE` (optional, default: true)
/// - `MONGODB_APP_NAME` (optional)
#[cfg(feature = "config")]
impl FromEnv for ReplicaSetConfig {
    fn from_env() -> Result<Self, ConfigError> {
        // Nodes first: nothing else matters if there is nowhere to connect
        let nodes = env_list("MONGODB_NODES")?
            .iter()
            .map(|node| node.parse::<NodeAddress>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|details| ConfigError::ParseError {
                key: "MONGODB_NODES".to_string(),
                details,
            })?;

        let password = env_required("MONGODB_PASSWORD")?;
        let replica_set = env_required("MONGODB_REPLICA_NAME")?;
        let username = env_or_default("MONGODB_USERNAME", DEFAULT_USERNAME);
        let database = env_or_default("MONGODB_DATABASE", DEFAULT_DATABASE);
        let tls = env_bool("MONGODB_TLS", true)?;
        let tls_validate = env_bool("MONGODB_TLS_VALIDATE", true)?;
        let app_name = std::env::var("MONGODB_APP_NAME").ok();

        Ok(Self {
            nodes,
            username,
            password,
            replica_set,
            database,
            tls,
            tls_validate,
            app_name,
        })
    }
}
