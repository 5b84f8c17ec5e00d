//! Database connection setup.

use crate::{Config, Error, Result};
use tokio_postgres::{Client, NoTls};

/// Connect to the database described by `config`.
///
/// The connection driver is spawned onto the runtime; it exits when the
/// client is dropped. Establishment is bounded by `config.connect_timeout`.
pub async fn connect(config: &Config) -> Result<Client> {
    let connect = tokio_postgres::connect(&config.database_url, NoTls);
    let (client, connection) = tokio::time::timeout(config.connect_timeout, connect)
        .await
        .map_err(|_| Error::ConnectTimeout(config.connect_timeout))??;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "connection task failed");
        }
    });

    tracing::info!("connected to database");
    Ok(client)
}
