//! Cluster access used by the poller.
//!
//! The poller only talks to these traits; `MongoConnector` is the real
//! implementation and tests substitute mocks.

use async_trait::async_trait;
use database::DatabaseResult;
use database::mongodb::{ReplicaSetConfig, ReplicaStatus, connect_from_config, fetch_replica_status};
use mongodb::{Client, Collection, bson::doc};
use tracing::debug;

use crate::probe::{PROBE_COLLECTION, ProbeRecord};

/// Opens one session per poll iteration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    /// Connect and verify that the replica set answers
    async fn connect(&self, config: &ReplicaSetConfig) -> DatabaseResult<Box<dyn ClusterSession>>;
}

/// A live connection, owned by a single iteration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterSession: Send + Sync {
    /// `replSetGetStatus`
    async fn replica_status(&self) -> DatabaseResult<ReplicaStatus>;

    /// Delete every document in the probe collection, returning how many were removed
    async fn clear_probes(&self, database: &str) -> DatabaseResult<u64>;

    async fn insert_probe(&self, database: &str, record: ProbeRecord) -> DatabaseResult<()>;

    /// First document of the probe collection, if any
    async fn first_probe(&self, database: &str) -> DatabaseResult<Option<ProbeRecord>>;

    /// Release the connection pool
    async fn close(&self);
}

/// Connects to a real replica set through the MongoDB driver
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

#[async_trait]
impl ClusterConnector for MongoConnector {
    async fn connect(&self, config: &ReplicaSetConfig) -> DatabaseResult<Box<dyn ClusterSession>> {
        let client = connect_from_config(config).await?;
        Ok(Box::new(MongoSession { client }))
    }
}

pub struct MongoSession {
    client: Client,
}

impl MongoSession {
    fn probes(&self, database: &str) -> Collection<ProbeRecord> {
        self.client.database(database).collection(PROBE_COLLECTION)
    }
}

#[async_trait]
impl ClusterSession for MongoSession {
    async fn replica_status(&self) -> DatabaseResult<ReplicaStatus> {
        fetch_replica_status(&self.client).await
    }

    async fn clear_probes(&self, database: &str) -> DatabaseResult<u64> {
        let result = self.probes(database).delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert_probe(&self, database: &str, record: ProbeRecord) -> DatabaseResult<()> {
        self.probes(database).insert_one(record).await?;
        Ok(())
    }

    async fn first_probe(&self, database: &str) -> DatabaseResult<Option<ProbeRecord>> {
        Ok(self.probes(database).find_one(doc! {}).await?)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        debug!("MongoDB client shut down");
    }
}
