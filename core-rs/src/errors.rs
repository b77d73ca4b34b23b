//! Error types for Cell KN Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnError {
    #[error("Ontology parse error in {path}: {message}")]
    OntologyParse { path: String, message: String },

    #[error("Unsupported ontology format: {0}")]
    UnsupportedFormat(String),

    #[error("Blank node still referenced after resolution: {0}")]
    UnresolvedBlankNode(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Missing schema column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Graph store error: {0}")]
    Store(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, KnError>;
