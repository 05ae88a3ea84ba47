//! Database library providing MongoDB replica set connectors and utilities
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB replica set support
//! - `config` - Configuration support with `core_config::FromEnv`
//!
//! # Examples
//!
//! ```ignore
//! use database::mongodb::{self, ReplicaSetConfig};
//! use core_config::FromEnv;
//!
//! let config = ReplicaSetConfig::from_env()?;
//! let client = mongodb::connect_from_config(&config).await?;
//! let status = mongodb::fetch_replica_status(&client).await?;
//! ```

// Always available modules
pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

// Re-exports for convenience
pub use common::{DatabaseError, DatabaseResult};
