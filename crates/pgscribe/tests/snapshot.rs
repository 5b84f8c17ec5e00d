//! Snapshot round-trip properties.

use pgscribe::schema::{Column, ForeignKey, KeyColumn, Schema, Table};
use pgscribe::snapshot;

fn sample_schema() -> Schema {
    let mut schema = Schema::new();
    schema.tables.insert(
        "projects".to_string(),
        Table {
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: "bigint".to_string(),
                    default: Some("nextval('projects_id_seq'::regclass)".to_string()),
                    nullable: false,
                    max_length: None,
                    precision: Some(64),
                    scale: Some(0),
                    udt_name: "int8".to_string(),
                },
                Column {
                    name: "name".to_string(),
                    data_type: "character varying".to_string(),
                    default: None,
                    nullable: false,
                    max_length: Some(255),
                    precision: None,
                    scale: None,
                    udt_name: "varchar".to_string(),
                },
            ],
            primary_keys: vec![KeyColumn {
                column: "id".to_string(),
                constraint: "projects_pkey".to_string(),
            }],
            foreign_keys: vec![],
            unique_constraints: vec![KeyColumn {
                column: "name".to_string(),
                constraint: "projects_name_key".to_string(),
            }],
        },
    );
    schema.tables.insert(
        "tasks".to_string(),
        Table {
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: "bigint".to_string(),
                    default: None,
                    nullable: false,
                    max_length: None,
                    precision: Some(64),
                    scale: Some(0),
                    udt_name: "int8".to_string(),
                },
                Column {
                    name: "project_id".to_string(),
                    data_type: "bigint".to_string(),
                    default: None,
                    nullable: true,
                    max_length: None,
                    precision: Some(64),
                    scale: Some(0),
                    udt_name: "int8".to_string(),
                },
            ],
            primary_keys: vec![KeyColumn {
                column: "id".to_string(),
                constraint: "tasks_pkey".to_string(),
            }],
            foreign_keys: vec![ForeignKey {
                column: "project_id".to_string(),
                references_table: "projects".to_string(),
                references_column: "id".to_string(),
                constraint: "tasks_project_id_fkey".to_string(),
            }],
            unique_constraints: vec![],
        },
    );
    schema
}

#[test]
fn round_trip_is_structurally_identical() {
    let schema = sample_schema();
    let json = serde_json::to_string_pretty(&schema).unwrap();
    let back: Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(schema, back);
}

#[test]
fn round_trip_preserves_table_order() {
    let schema = sample_schema();
    let json = serde_json::to_string_pretty(&schema).unwrap();
    let back: Schema = serde_json::from_str(&json).unwrap();
    let names: Vec<&String> = back.tables.keys().collect();
    assert_eq!(names, vec!["projects", "tasks"]);
}

#[test]
fn save_and_load_through_a_file() {
    let schema = sample_schema();
    let path = std::env::temp_dir().join(format!("pgscribe-snapshot-{}.json", std::process::id()));

    snapshot::save(&schema, &path).unwrap();
    let back = snapshot::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(schema, back);
}

#[test]
fn document_uses_two_space_indentation() {
    let schema = sample_schema();
    let json = serde_json::to_string_pretty(&schema).unwrap();
    assert!(json.contains("\n  \"projects\": {"));
    assert!(json.contains("\n    \"columns\": ["));
}

#[test]
fn load_of_missing_file_is_fatal() {
    let path = std::env::temp_dir().join("pgscribe-does-not-exist.json");
    assert!(snapshot::load(&path).is_err());
}

#[test]
fn load_of_malformed_document_is_fatal() {
    let path = std::env::temp_dir().join(format!("pgscribe-malformed-{}.json", std::process::id()));
    std::fs::write(&path, "{ not json").unwrap();
    let result = snapshot::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[test]
fn sample_schema_has_no_orphan_foreign_keys() {
    assert!(sample_schema().orphan_foreign_keys().is_empty());
}
