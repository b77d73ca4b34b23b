/**
 * model.rs
 * Canonical term value shared by every conversion stage
 */

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Namespace assigned to identifiers no prefix mapping recognizes
pub const UNKNOWN_NAMESPACE: &str = "unknown";

/// Where a term was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Obo,
    Schema,
}

/// Resolved ontology term
///
/// Identity is the canonical id: two terms with the same id are the same
/// entity regardless of label, namespace or source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub label: Option<String>,
    pub namespace: String,
    pub source: Source,
}

impl Term {
    pub fn new(id: impl Into<String>, label: Option<String>, namespace: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            label,
            namespace: namespace.into(),
            source,
        }
    }

    /// Copy of this term introduced by the schema, carrying the schema label
    pub fn as_schema_term(&self, label: Option<String>) -> Self {
        Self {
            id: self.id.clone(),
            label: label.or_else(|| self.label.clone()),
            namespace: self.namespace.clone(),
            source: Source::Schema,
        }
    }

    pub fn is_known(&self) -> bool {
        self.namespace != UNKNOWN_NAMESPACE
    }

    /// Label if present, otherwise the canonical id
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({})", self.id, label),
            None => write!(f, "{}", self.id),
        }
    }
}
