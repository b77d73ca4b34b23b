/**
 * store.rs
 * GraphStore seam and the records it persists
 */

use serde::Serialize;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeSet;

use crate::errors::Result;
use crate::term::Term;

/// Document attributes, merged on upsert
pub type Attributes = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexRecord {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl VertexRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attributes: Attributes::new(),
        }
    }

    /// Vertex for a term: keyed by canonical id with `label` and `namespace`
    pub fn from_term(term: &Term) -> Self {
        let mut vertex = Self::new(term.id.clone());
        if let Some(label) = &term.label {
            vertex.attributes.insert("label".to_string(), json!(label));
        }
        vertex
            .attributes
            .insert("namespace".to_string(), json!(term.namespace));
        vertex
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRecord {
    #[serde(rename = "_key")]
    pub key: String,
    /// `collection/key` of the source vertex
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl EdgeRecord {
    /// Edge between two terms, keyed by the `(from, to)` pair
    pub fn between(from: &Term, to: &Term, predicate: &Term) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("predicate".to_string(), json!(predicate.id));
        if let Some(label) = &predicate.label {
            attributes.insert("label".to_string(), json!(label));
        }
        Self {
            key: edge_key(&from.id, &to.id),
            from: format!("{}/{}", from.namespace, from.id),
            to: format!("{}/{}", to.namespace, to.id),
            attributes,
        }
    }
}

/// Edge collection with the vertex collections it may connect
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: BTreeSet<String>,
    pub to: BTreeSet<String>,
}

impl EdgeDefinition {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Add a from/to pair, returns true if either side was new
    pub fn extend(&mut self, from: &str, to: &str) -> bool {
        let added_from = self.from.insert(from.to_string());
        let added_to = self.to.insert(to.to_string());
        added_from || added_to
    }
}

/// Edge key for a `(from, to)` pair
pub fn edge_key(from: &str, to: &str) -> String {
    format!("{}-{}", from, to)
}

/// Edge collection name for a predicate id (`BFO:0000050` → `BFO_0000050`)
pub fn edge_collection_name(predicate_id: &str) -> String {
    predicate_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Persistence seam for the property-graph loader
///
/// Every operation is idempotent: creating what exists is a no-op and
/// upserting an existing key merges attributes.
pub trait GraphStore: Send + Sync {
    fn create_or_get_database(&self, name: &str) -> Result<()>;

    fn create_or_get_graph(&self, name: &str) -> Result<()>;

    fn ensure_vertex_collection(&self, name: &str) -> Result<()>;

    /// Create the edge collection or replace its from/to definition
    fn define_edge_collection(&self, definition: &EdgeDefinition) -> Result<()>;

    fn upsert_vertex(&self, collection: &str, vertex: &VertexRecord) -> Result<()>;

    fn upsert_edge(&self, collection: &str, edge: &EdgeRecord) -> Result<()>;
}
