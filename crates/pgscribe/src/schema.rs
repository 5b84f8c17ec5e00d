//! Schema model for a Postgres database snapshot.
//!
//! A [`Schema`] is an insertion-ordered map from table name to [`Table`],
//! mirroring the JSON snapshot document on disk:
//!
//! ```json
//! {
//!   "orders": {
//!     "columns": [...],
//!     "primary_keys": [...],
//!     "foreign_keys": [...],
//!     "unique_constraints": [...]
//!   }
//! }
//! ```
//!
//! Table names are the join key between introspection and rendering; no
//! identifier remapping happens anywhere in between.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete database schema, keyed by table name.
///
/// Iteration order is the order tables were inserted during introspection
/// (which itself orders by table name), preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Table names in lexicographic order, for document rendering.
    pub fn sorted_table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Foreign keys whose source column does not exist in its own table.
    ///
    /// A healthy snapshot returns an empty list; anything else means the
    /// catalog views diverged mid-extraction.
    pub fn orphan_foreign_keys(&self) -> Vec<(&str, &str)> {
        let mut orphans = Vec::new();
        for (table_name, table) in &self.tables {
            for fk in &table.foreign_keys {
                if !table.columns.iter().any(|c| c.name == fk.column) {
                    orphans.push((table_name.as_str(), fk.column.as_str()));
                }
            }
        }
        orphans
    }
}

/// A single table: columns in ordinal order plus key memberships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_keys: Vec<KeyColumn>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub unique_constraints: Vec<KeyColumn>,
}

impl Table {
    /// Whether the named column is part of the primary key.
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk.column == column)
    }

    /// Whether the named column carries a unique constraint.
    pub fn is_unique(&self, column: &str) -> bool {
        self.unique_constraints.iter().any(|uc| uc.column == column)
    }

    /// The foreign key sourced at the named column, if any.
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}

/// A column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table.
    pub name: String,
    /// Declared type name (e.g. `character varying`, `numeric`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Default expression, raw catalog text.
    pub default: Option<String>,
    /// Nullability; stored as `"YES"`/`"NO"` in the snapshot document.
    #[serde(with = "yes_no")]
    pub nullable: bool,
    /// Maximum character length, for character types.
    #[serde(default, deserialize_with = "opt_u32_lenient")]
    pub max_length: Option<u32>,
    /// Numeric precision, for numeric types.
    #[serde(default, deserialize_with = "opt_u32_lenient")]
    pub precision: Option<u32>,
    /// Numeric scale, for numeric types.
    #[serde(default, deserialize_with = "opt_u32_lenient")]
    pub scale: Option<u32>,
    /// Underlying type name (e.g. `int8`, `varchar`).
    pub udt_name: String,
}

impl Column {
    /// The documented type signature for this column.
    ///
    /// `type(max_length)` if a length is present, else
    /// `type(precision,scale)` if both are present, else
    /// `type(precision)` if only precision is, else the bare type name.
    pub fn formatted_type(&self) -> String {
        match (self.max_length, self.precision, self.scale) {
            (Some(len), _, _) => format!("{}({})", self.data_type, len),
            (None, Some(p), Some(s)) => format!("{}({},{})", self.data_type, p, s),
            (None, Some(p), None) => format!("{}({})", self.data_type, p),
            (None, None, _) => self.data_type.clone(),
        }
    }
}

/// One column's membership in a primary-key or unique constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyColumn {
    pub column: String,
    pub constraint: String,
}

/// A foreign-key column reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Source column in this table.
    pub column: String,
    /// Referenced table.
    pub references_table: String,
    /// Referenced column.
    pub references_column: String,
    /// Constraint name.
    pub constraint: String,
}

/// Serialize nullability as the catalog's `"YES"`/`"NO"` strings.
mod yes_no {
    use serde::de::{self, Deserializer, Visitor};
    use serde::ser::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(nullable: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *nullable { "YES" } else { "NO" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        struct YesNo;

        impl Visitor<'_> for YesNo {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("\"YES\", \"NO\", or a boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
                match v {
                    "YES" | "yes" => Ok(true),
                    "NO" | "no" => Ok(false),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }
        }

        deserializer.deserialize_any(YesNo)
    }
}

/// Deserialize an optional integer that some encoders emit as a string.
///
/// Precision and scale must be tolerated as either `10` or `"10"`.
fn opt_u32_lenient<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct Lenient;

    impl Visitor<'_> for Lenient {
        type Value = Option<u32>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer, a numeric string, or null")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            u32::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u32::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse::<u32>()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Lenient)
}
