use mongodb::{Client, bson::doc, options::ClientOptions};
use tracing::{debug, info};

use super::ReplicaSetConfig;
use crate::common::{DatabaseError, DatabaseResult};

/// Build the `mongodb://` connection string for a replica set
///
/// Credentials and the replica set name are percent-encoded. Certificate
/// validation is expressed with the driver's `tlsAllowInvalidCertificates`
/// option and only emitted when TLS is on (the driver rejects TLS options
/// on a plain connection).
///
/// # Example
/// ```ignore
/// // mongodb://admin:p%40ss@a:27017,b:27017/?ssl=true&tlsAllowInvalidCertificates=false&replicaSet=rs0
/// let url = build_connection_string(&config);
/// ```
pub fn build_connection_string(config: &ReplicaSetConfig) -> String {
    let mut url = format!(
        "mongodb://{}:{}@{}/?ssl={}",
        urlencoding::encode(&config.username),
        urlencoding::encode(&config.password),
        config.hosts(),
        config.tls,
    );

    if config.tls {
        url.push_str(&format!(
            "&tlsAllowInvalidCertificates={}",
            !config.tls_validate
        ));
    }

    url.push_str(&format!(
        "&replicaSet={}",
        urlencoding::encode(&config.replica_set)
    ));

    url
}

/// Check that the deployment answers a `ping` on `admin`.
///
/// The driver connects lazily, so a `Client` is not proof of a live cluster
/// until a command round-trips. During an election this is where the
/// failure shows up.
pub async fn verify_connection(client: &Client) -> DatabaseResult<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
    Ok(())
}

/// Connect using a ReplicaSetConfig and return a verified Client
///
/// # Example
/// ```ignore
/// use database::mongodb::{ReplicaSetConfig, connect_from_config};
/// use core_config::FromEnv;
///
/// let config = ReplicaSetConfig::from_env()?;
/// let client = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &ReplicaSetConfig) -> DatabaseResult<Client> {
    let url = build_connection_string(config);
    let mut options = ClientOptions::parse(url.as_str()).await?;

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let hosts = config.hosts();
    debug!(hosts = %hosts, repl_set = %config.replica_set, "Connecting to MongoDB");

    let client = verified(Client::with_options(options)?).await?;

    info!(hosts = %hosts, "Connected to MongoDB");
    Ok(client)
}

/// Hand back `client` once it answers, otherwise release its pool before
/// reporting the failure
async fn verified(client: Client) -> DatabaseResult<Client> {
    match verify_connection(&client).await {
        Ok(()) => Ok(client),
        Err(e) => {
            client.shutdown().await;
            Err(e)
        }
    }
}
