//! Connection configuration.
//!
//! Settings come from the environment (the CLI loads a `.env` file first):
//! `DATABASE_URL` is required, `PGSCRIBE_SCHEMA` optionally overrides the
//! introspected namespace (default `public`).

use crate::{Error, Result};
use std::time::Duration;

/// Default bound on connection establishment.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for all subcommands.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string (`postgres://...` or key=value form).
    pub database_url: String,
    /// Schema namespace to introspect.
    pub schema: String,
    /// Bound on connection establishment.
    pub connect_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// `database_url` takes precedence over `DATABASE_URL` when given.
    pub fn from_env(database_url: Option<String>) -> Result<Self> {
        let database_url = match database_url {
            Some(url) => url,
            None => std::env::var("DATABASE_URL").map_err(|_| {
                Error::Config("DATABASE_URL is not set (pass --database-url or set it in .env)".into())
            })?,
        };

        let schema = std::env::var("PGSCRIBE_SCHEMA").unwrap_or_else(|_| "public".to_string());

        Ok(Self {
            database_url,
            schema,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }
}
