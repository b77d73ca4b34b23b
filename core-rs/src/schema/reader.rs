/**
 * reader.rs
 * Typed readers for the Cell KN schema sheet exports (CSV)
 *
 * Schema sheet: `Subject Node, Predicate Relation, Object Node, Connections`
 * Relations sheet: `Name, Label, CURIE`
 *
 * Required columns are checked against the header row before any record is
 * read; extra columns are ignored.
 */

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::errors::{KnError, Result};

/// Only class-to-class schema rows are converted
pub const CLASS_CLASS: &str = "Class-Class";

/// One row of the schema sheet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaRow {
    #[serde(rename = "Subject Node")]
    pub subject: String,
    #[serde(rename = "Predicate Relation")]
    pub predicate: String,
    #[serde(rename = "Object Node")]
    pub object: String,
    #[serde(rename = "Connections", default)]
    pub connections: String,
}

impl SchemaRow {
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
            connections: CLASS_CLASS.to_string(),
        }
    }

    pub fn is_class_class(&self) -> bool {
        self.connections.trim() == CLASS_CLASS
    }
}

/// One row of the relations sheet: schema name → label, CURIE
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationRow {
    #[serde(rename = "Name", alias = "Schema Name")]
    pub name: String,
    #[serde(rename = "Label", default)]
    pub label: Option<String>,
    #[serde(rename = "CURIE", alias = "Curie")]
    pub curie: String,
}

impl RelationRow {
    pub fn new(name: &str, label: &str, curie: &str) -> Self {
        Self {
            name: name.to_string(),
            label: Some(label.to_string()),
            curie: curie.to_string(),
        }
    }
}

const SCHEMA_COLUMNS: &[&[&str]] = &[&["Subject Node"], &["Predicate Relation"], &["Object Node"], &["Connections"]];
const RELATION_COLUMNS: &[&[&str]] = &[&["Name", "Schema Name"], &["Label"], &["CURIE", "Curie"]];

/// Read the schema sheet, keeping only `Class-Class` rows
pub fn read_schema_rows(path: &Path) -> Result<Vec<SchemaRow>> {
    let rows: Vec<SchemaRow> = read_rows(path, SCHEMA_COLUMNS)?;
    let total = rows.len();
    let rows: Vec<SchemaRow> = rows.into_iter().filter(|r| r.is_class_class()).collect();
    info!(
        "[SchemaReader] {} of {} schema rows are {}",
        rows.len(),
        total,
        CLASS_CLASS
    );
    Ok(rows)
}

/// Read the relations sheet
pub fn read_relation_rows(path: &Path) -> Result<Vec<RelationRow>> {
    read_rows(path, RELATION_COLUMNS)
}

fn read_rows<T>(path: &Path, required: &[&[&str]]) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Err(KnError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    for accepted in required {
        if !accepted.iter().any(|name| headers.iter().any(|h| h == *name)) {
            return Err(KnError::MissingColumn {
                column: accepted[0].to_string(),
                path: path.display().to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
