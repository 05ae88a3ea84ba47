use database::DatabaseError;

/// Errors that end a probe run
///
/// Connection failures never reach this type: the connector retries them.
/// Anything here is fatal for the process.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The document read back is not the one just written
    #[error("Test datas aren't identical! read {read} !== written {written}")]
    Mismatch { written: String, read: String },

    /// The collection was empty right after the insert
    #[error("Probe document missing from collection '{collection}' right after insert")]
    Missing { collection: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

pub type ProbeResult<T> = Result<T, ProbeError>;
