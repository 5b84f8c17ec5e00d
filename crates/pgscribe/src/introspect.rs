//! Catalog introspection against `information_schema`.
//!
//! Five read-only queries: table list, columns in ordinal order, then
//! primary-key, foreign-key and unique-constraint memberships. The
//! table→columns map is built first; key rows are appended by table-name
//! lookup, and rows referencing a table absent from the initial list are
//! dropped (catalog views can diverge under concurrent DDL).
//!
//! Any query failure aborts the extraction; there is no partial schema.

use crate::Result;
use crate::schema::{Column, ForeignKey, KeyColumn, Schema, Table};
use tokio_postgres::Client;

const TABLES_SQL: &str = "\
    SELECT table_name
    FROM information_schema.tables
    WHERE table_schema = $1
      AND table_type = 'BASE TABLE'
    ORDER BY table_name";

const COLUMNS_SQL: &str = "\
    SELECT
        c.table_name,
        c.column_name,
        c.data_type,
        c.column_default,
        c.is_nullable,
        c.character_maximum_length,
        c.numeric_precision,
        c.numeric_scale,
        c.udt_name
    FROM information_schema.columns c
    WHERE c.table_schema = $1
    ORDER BY c.table_name, c.ordinal_position";

const PRIMARY_KEYS_SQL: &str = "\
    SELECT
        tc.table_name,
        kcu.column_name,
        tc.constraint_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
    WHERE tc.table_schema = $1
      AND tc.constraint_type = 'PRIMARY KEY'
    ORDER BY tc.table_name, kcu.ordinal_position";

const FOREIGN_KEYS_SQL: &str = "\
    SELECT
        tc.table_name,
        kcu.column_name,
        ccu.table_name AS references_table,
        ccu.column_name AS references_column,
        tc.constraint_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage ccu
        ON ccu.constraint_name = tc.constraint_name
        AND ccu.table_schema = tc.table_schema
    WHERE tc.table_schema = $1
      AND tc.constraint_type = 'FOREIGN KEY'
    ORDER BY tc.table_name";

const UNIQUE_CONSTRAINTS_SQL: &str = "\
    SELECT
        tc.table_name,
        kcu.column_name,
        tc.constraint_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
    WHERE tc.table_schema = $1
      AND tc.constraint_type = 'UNIQUE'
    ORDER BY tc.table_name, kcu.ordinal_position";

/// Introspect every table in the given schema namespace.
pub async fn introspect(client: &Client, schema_name: &str) -> Result<Schema> {
    let mut schema = Schema::new();

    let rows = client.query(TABLES_SQL, &[&schema_name]).await?;
    for row in &rows {
        let name: String = row.get(0);
        schema.tables.insert(name, Table::default());
    }
    tracing::info!(tables = schema.tables.len(), schema = schema_name, "found tables");

    let rows = client.query(COLUMNS_SQL, &[&schema_name]).await?;
    for row in &rows {
        let table_name: String = row.get(0);
        let Some(table) = schema.tables.get_mut(&table_name) else {
            tracing::debug!(table = %table_name, "skipping column row for unknown table");
            continue;
        };
        let is_nullable: String = row.get(4);
        table.columns.push(Column {
            name: row.get(1),
            data_type: row.get(2),
            default: row.get(3),
            nullable: is_nullable == "YES",
            max_length: row.get::<_, Option<i32>>(5).map(|v| v as u32),
            precision: row.get::<_, Option<i32>>(6).map(|v| v as u32),
            scale: row.get::<_, Option<i32>>(7).map(|v| v as u32),
            udt_name: row.get(8),
        });
    }

    let rows = client.query(PRIMARY_KEYS_SQL, &[&schema_name]).await?;
    for row in &rows {
        let table_name: String = row.get(0);
        let Some(table) = schema.tables.get_mut(&table_name) else {
            tracing::debug!(table = %table_name, "skipping primary-key row for unknown table");
            continue;
        };
        table.primary_keys.push(KeyColumn {
            column: row.get(1),
            constraint: row.get(2),
        });
    }

    let rows = client.query(FOREIGN_KEYS_SQL, &[&schema_name]).await?;
    for row in &rows {
        let table_name: String = row.get(0);
        let Some(table) = schema.tables.get_mut(&table_name) else {
            tracing::debug!(table = %table_name, "skipping foreign-key row for unknown table");
            continue;
        };
        table.foreign_keys.push(ForeignKey {
            column: row.get(1),
            references_table: row.get(2),
            references_column: row.get(3),
            constraint: row.get(4),
        });
    }

    let rows = client.query(UNIQUE_CONSTRAINTS_SQL, &[&schema_name]).await?;
    for row in &rows {
        let table_name: String = row.get(0);
        let Some(table) = schema.tables.get_mut(&table_name) else {
            tracing::debug!(table = %table_name, "skipping unique-constraint row for unknown table");
            continue;
        };
        table.unique_constraints.push(KeyColumn {
            column: row.get(1),
            constraint: row.get(2),
        });
    }

    Ok(schema)
}
