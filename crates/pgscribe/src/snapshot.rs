//! JSON snapshot persistence for a [`Schema`].
//!
//! The document is two-space indented and preserves the extractor's table
//! iteration order. Everything the renderer needs round-trips losslessly;
//! precision/scale are tolerated as strings or numbers on the way back in
//! (see the lenient deserializer in the schema module).

use crate::schema::Schema;
use crate::{Error, Result};
use std::path::Path;

/// Write `schema` to `path` as pretty-printed JSON.
pub fn save(schema: &Schema, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(schema)?;
    std::fs::write(path, json).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), tables = schema.tables.len(), "snapshot written");
    Ok(())
}

/// Load a schema snapshot from `path`.
///
/// A missing file or malformed document is fatal; no partial schema is
/// ever returned.
pub fn load(path: &Path) -> Result<Schema> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| Error::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}
