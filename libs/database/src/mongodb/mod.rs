//! MongoDB replica set connector and utilities
//!
//! Provides connection-string construction, verified connections, and the
//! replica set status model used to report member health.

mod config;
mod connector;
mod health;

pub use config::{DEFAULT_DATABASE, DEFAULT_PORT, DEFAULT_USERNAME, NodeAddress, ReplicaSetConfig};
pub use connector::{
    build_connection_string, connect_from_config, verify_connection,
};
pub use health::{MemberState, MemberStatus, ReplicaStatus, fetch_replica_status};

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database, bson};
