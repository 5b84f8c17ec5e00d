//! Markdown documentation rendering.
//!
//! Takes a [`Schema`] (usually loaded from a snapshot) and produces a
//! single Markdown document: table of contents, a Postgres→Rust type
//! reference, one section per table, a Mermaid relationship overview,
//! and a static best-practices block.
//!
//! Rendering is pure; running it twice over the same snapshot yields
//! byte-identical output.

use crate::schema::{Schema, Table};
use crate::{Error, Result};
use std::path::Path;

/// Longest default expression shown in a columns table.
const MAX_DEFAULT_LEN: usize = 30;

/// Postgres type name → (Rust type, note).
///
/// These names match what a tokio-postgres row hands back for each type.
pub const TYPE_MAPPINGS: &[(&str, &str, &str)] = &[
    ("bigint", "i64", "64-bit integer"),
    ("boolean", "bool", ""),
    ("bytea", "Vec<u8>", "raw bytes"),
    ("character varying", "String", "bounded length enforced by the database"),
    ("date", "Date", ""),
    ("decimal", "Decimal", "arbitrary precision"),
    ("double precision", "f64", ""),
    ("float4", "f32", ""),
    ("float8", "f64", ""),
    ("int2", "i16", "16-bit integer"),
    ("int4", "i32", "32-bit integer"),
    ("int8", "i64", "64-bit integer"),
    ("integer", "i32", "32-bit integer"),
    ("json", "JsonValue", "parse on demand"),
    ("jsonb", "JsonValue", "parse on demand"),
    ("numeric", "Decimal", "arbitrary precision"),
    ("real", "f32", ""),
    ("smallint", "i16", "16-bit integer"),
    ("text", "String", "unbounded"),
    ("time without time zone", "Time", ""),
    ("timestamp with time zone", "Timestamp", "timezone-aware"),
    ("timestamp without time zone", "Timestamp", ""),
    ("uuid", "Uuid", ""),
    ("varchar", "String", "bounded length enforced by the database"),
];

/// Map a Postgres type name to its Rust counterpart.
///
/// Unrecognized names pass through unchanged.
pub fn rust_type_for(pg_type: &str) -> &str {
    TYPE_MAPPINGS
        .iter()
        .find(|(pg, _, _)| *pg == pg_type)
        .map(|(_, rust, _)| *rust)
        .unwrap_or(pg_type)
}

/// Render the full Markdown document for `schema`.
pub fn render(schema: &Schema) -> String {
    let mut out = String::new();
    let names = schema.sorted_table_names();

    out.push_str("# Database Schema\n\n");
    out.push_str(&format!("**Total tables:** {}\n\n", schema.tables.len()));

    out.push_str("## Table of Contents\n\n");
    for (i, name) in names.iter().enumerate() {
        out.push_str(&format!("{}. [{}](#{})\n", i + 1, name, anchor(name)));
    }
    out.push_str("\n---\n\n");

    out.push_str("## Data Type Mappings (PostgreSQL → Rust)\n\n");
    out.push_str("| PostgreSQL Type | Rust Type | Notes |\n");
    out.push_str("|-----------------|-----------|-------|\n");
    for (pg, rust, note) in TYPE_MAPPINGS {
        out.push_str(&format!("| `{}` | `{}` | {} |\n", pg, rust, note));
    }
    out.push_str("\n---\n\n");

    for name in &names {
        let table = &schema.tables[*name];
        render_table(&mut out, name, table);
        out.push_str("---\n\n");
    }

    render_relationships(&mut out, schema, &names);
    render_best_practices(&mut out);

    out
}

/// Render the document and write it to `path`.
pub fn write_to(schema: &Schema, path: &Path) -> Result<()> {
    let doc = render(schema);
    std::fs::write(path, doc).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "documentation written");
    Ok(())
}

fn render_table(out: &mut String, name: &str, table: &Table) {
    out.push_str(&format!("## {}\n\n", name));

    out.push_str("### Columns\n\n");
    out.push_str("| Column | Type | Nullable | Default | Notes |\n");
    out.push_str("|--------|------|----------|---------|-------|\n");
    for col in &table.columns {
        let nullable = if col.nullable { "✓" } else { "✗" };
        let default = match &col.default {
            Some(d) => format!("`{}`", truncate_default(d)),
            None => "-".to_string(),
        };

        let mut notes = Vec::new();
        if table.is_primary_key(&col.name) {
            notes.push("🔑 PK".to_string());
        }
        if let Some(fk) = table.foreign_key_for(&col.name) {
            notes.push(format!(
                "🔗 FK → `{}.{}`",
                fk.references_table, fk.references_column
            ));
        }
        if table.is_unique(&col.name) {
            notes.push("◇ UNIQUE".to_string());
        }
        let notes = if notes.is_empty() {
            "-".to_string()
        } else {
            notes.join(", ")
        };

        out.push_str(&format!(
            "| `{}` | `{}` | {} | {} | {} |\n",
            col.name,
            col.formatted_type(),
            nullable,
            default,
            notes
        ));
    }
    out.push('\n');

    if !table.primary_keys.is_empty() {
        out.push_str("### Primary Key\n\n");
        if table.primary_keys.len() == 1 {
            out.push_str(&format!("`{}`\n\n", table.primary_keys[0].column));
        } else {
            let cols: Vec<String> = table
                .primary_keys
                .iter()
                .map(|pk| format!("`{}`", pk.column))
                .collect();
            out.push_str(&format!("Composite: {}\n\n", cols.join(", ")));
        }
    }

    if !table.foreign_keys.is_empty() {
        out.push_str("### Foreign Keys\n\n");
        for fk in &table.foreign_keys {
            out.push_str(&format!(
                "- `{}` → `{}.{}`\n",
                fk.column, fk.references_table, fk.references_column
            ));
        }
        out.push('\n');
    }

    if !table.unique_constraints.is_empty() {
        out.push_str("### Unique Constraints\n\n");
        for uc in &table.unique_constraints {
            out.push_str(&format!("- `{}`\n", uc.column));
        }
        out.push('\n');
    }
}

fn render_relationships(out: &mut String, schema: &Schema, names: &[&str]) {
    out.push_str("## Entity Relationship Overview\n\n");
    out.push_str("```mermaid\nerDiagram\n");

    // One edge per distinct (referencing, referenced) pair, first seen wins.
    let mut seen = Vec::new();
    for name in names {
        for fk in &schema.tables[*name].foreign_keys {
            let edge = (fk.references_table.as_str(), *name);
            if seen.contains(&edge) {
                continue;
            }
            seen.push(edge);
            out.push_str(&format!(
                "    {} ||--o{{ {} : \"has\"\n",
                fk.references_table, name
            ));
        }
    }

    out.push_str("```\n\n");
}

fn render_best_practices(out: &mut String) {
    out.push_str("## Best Practices\n\n");

    out.push_str("### Foreign Key Constraints\n\n");
    out.push_str("- Check for dependent rows before deleting parent entities\n");
    out.push_str("- Reserve cascade deletes for non-critical audit/log data\n");
    out.push_str("- Business-critical records should require explicit deletion\n");
    out.push_str("- Surface constraint violations with clear error messages\n\n");

    out.push_str("### Nullable vs Non-Nullable Fields\n\n");
    out.push_str("- Columns documented with ✗ must always carry a value\n");
    out.push_str("- Model non-nullable columns as plain fields, nullable ones as `Option<T>`\n");
    out.push_str("- Validate required fields before persistence\n\n");

    out.push_str("### Data Type Considerations\n\n");
    out.push_str("- Use `Decimal` for monetary values (`numeric`/`decimal` columns)\n");
    out.push_str("- Use `Date` for dates without time, `Timestamp` for points in time\n");
    out.push_str("- Treat `jsonb` columns as raw JSON and parse on demand\n");
    out.push_str("- Use `i64` for `bigint` identifier columns\n");
}

/// Anchor for a table heading: underscores become hyphens.
fn anchor(table: &str) -> String {
    table.replace('_', "-")
}

/// Bound a default expression to [`MAX_DEFAULT_LEN`] characters.
fn truncate_default(default: &str) -> String {
    if default.chars().count() <= MAX_DEFAULT_LEN {
        return default.to_string();
    }
    let head: String = default.chars().take(MAX_DEFAULT_LEN - 3).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKey, KeyColumn};

    fn column(name: &str, data_type: &str) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            default: None,
            nullable: true,
            max_length: None,
            precision: None,
            scale: None,
            udt_name: data_type.to_string(),
        }
    }

    fn fk(column: &str, table: &str) -> ForeignKey {
        ForeignKey {
            column: column.to_string(),
            references_table: table.to_string(),
            references_column: "id".to_string(),
            constraint: format!("{}_fkey", column),
        }
    }

    #[test]
    fn rust_type_lookup_passes_unknown_through() {
        assert_eq!(rust_type_for("bigint"), "i64");
        assert_eq!(rust_type_for("uuid"), "Uuid");
        assert_eq!(rust_type_for("tsvector"), "tsvector");
    }

    #[test]
    fn anchor_replaces_underscores() {
        assert_eq!(anchor("project_invoices"), "project-invoices");
        assert_eq!(anchor("orders"), "orders");
    }

    #[test]
    fn truncate_default_bounds_long_expressions() {
        let short = "now()";
        assert_eq!(truncate_default(short), "now()");

        let long = "nextval('some_really_long_sequence_name_seq'::regclass)";
        let truncated = truncate_default(long);
        assert_eq!(truncated.chars().count(), MAX_DEFAULT_LEN);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn duplicate_foreign_keys_collapse_to_one_edge() {
        let mut schema = Schema::new();
        schema.tables.insert(
            "tasks".to_string(),
            Table {
                columns: vec![
                    column("project_id", "bigint"),
                    column("parent_project_id", "bigint"),
                ],
                foreign_keys: vec![fk("project_id", "projects"), fk("parent_project_id", "projects")],
                ..Default::default()
            },
        );

        let doc = render(&schema);
        let edges = doc
            .lines()
            .filter(|l| l.contains("||--o{"))
            .collect::<Vec<_>>();
        assert_eq!(edges, vec!["    projects ||--o{ tasks : \"has\""]);
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut schema = Schema::new();
        schema.tables.insert(
            "users".to_string(),
            Table {
                columns: vec![column("id", "bigint"), column("email", "text")],
                primary_keys: vec![KeyColumn {
                    column: "id".to_string(),
                    constraint: "users_pkey".to_string(),
                }],
                unique_constraints: vec![KeyColumn {
                    column: "email".to_string(),
                    constraint: "users_email_key".to_string(),
                }],
                ..Default::default()
            },
        );

        assert_eq!(render(&schema), render(&schema));
    }

    #[test]
    fn composite_primary_key_is_comma_joined() {
        let mut schema = Schema::new();
        schema.tables.insert(
            "post_tag".to_string(),
            Table {
                columns: vec![column("post_id", "bigint"), column("tag_id", "bigint")],
                primary_keys: vec![
                    KeyColumn {
                        column: "post_id".to_string(),
                        constraint: "post_tag_pkey".to_string(),
                    },
                    KeyColumn {
                        column: "tag_id".to_string(),
                        constraint: "post_tag_pkey".to_string(),
                    },
                ],
                ..Default::default()
            },
        );

        let doc = render(&schema);
        assert!(doc.contains("Composite: `post_id`, `tag_id`"));
    }

    #[test]
    fn tables_render_in_lexicographic_order() {
        let mut schema = Schema::new();
        schema.tables.insert("zebra".to_string(), Table::default());
        schema.tables.insert("alpha".to_string(), Table::default());

        let doc = render(&schema);
        let alpha = doc.find("## alpha").unwrap();
        let zebra = doc.find("## zebra").unwrap();
        assert!(alpha < zebra);
    }
}
