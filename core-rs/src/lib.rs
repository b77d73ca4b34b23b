//! # Cell KN Core - ontology to property graph
//!
//! Converts OBO/OWL ontologies and the curated Cell KN schema into a labeled
//! property graph: vertex collections per namespace, edge collections per
//! predicate.
//!
//! ## Data Flow
//!
//! ```text
//! ontology files ──► TripleCollector ──► filled triples ─────────────┐
//!                          │                                         ▼
//!                          └──► blank-node sets ──► BlankNodeResolver ──► statements ──► PropertyGraphLoader ──► GraphStore
//!                                                                    ▲
//! schema CSV ──► SchemaTripleBuilder ────────────────────────────────┘
//! ```
//!
//! Every stage resolves identifiers through a `TermResolver` scoped to one
//! ontology file; there are no process-wide caches.

pub mod errors;
pub mod fetch;
pub mod graph;
pub mod pipeline;
pub mod schema;
pub mod term;
pub mod triples;

pub use errors::{KnError, Result};
pub use fetch::{CachedFetcher, LocalFetcher, OntologyFetcher};
pub use graph::{ArangoStore, EdgeDefinition, EdgeRecord, GraphStore, LoadReport, MemoryGraphStore, PropertyGraphLoader, VertexRecord};
pub use pipeline::{Pipeline, PipelineConfig, RunReport};
pub use schema::{RelationTable, SchemaRow, SchemaTripleBuilder, SchemaTriples};
pub use term::{LabelIndex, PrefixMapping, Source, Term, TermResolver};
pub use triples::{
    resolve_blank_nodes, BlankNodeResolver, BlankNodeTripleSets, Collection, Node, Object, Resolution, Statement,
    Triple, TripleCollector, UnresolvedReason,
};

/// Version of the converter
pub const VERSION: &str = "0.4.2";
