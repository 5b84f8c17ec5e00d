//! Postgres schema snapshots and Markdown documentation.
//!
//! This crate provides:
//! - Catalog introspection into a [`Schema`] (tables, columns, keys)
//! - JSON snapshot serialization for that schema
//! - Markdown documentation rendering from a snapshot
//! - A migration applier that runs SQL files statement by statement,
//!   skipping objects that already exist
//!
//! The usual flow is `fetch` (introspect + snapshot), then `docs`
//! (snapshot + render). The applier is independent of both.

mod apply;
mod config;
mod connect;
pub mod docs;
mod error;
mod introspect;
pub mod schema;
pub mod snapshot;

pub use apply::{ApplyReport, apply_file, index_name, split_statements};
pub use config::Config;
pub use connect::connect;
pub use error::Error;
pub use introspect::introspect;
pub use schema::{Column, ForeignKey, KeyColumn, Schema, Table};

/// Result type for pgscribe operations.
pub type Result<T> = std::result::Result<T, Error>;
