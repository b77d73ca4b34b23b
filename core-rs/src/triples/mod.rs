/**
 * triples module
 *
 * - model: raw triples with blank nodes, canonical statements
 * - collector: single-pass parse into filled triples and blank-node triple sets
 * - blank_node: rewrite blank-node patterns into canonical statements
 */

pub mod blank_node;
pub mod collector;
pub mod model;

pub use blank_node::{resolve_blank_nodes, BlankNodeResolver, PatternKind, Resolution, UnresolvedReason, MAX_LIST_LENGTH};
pub use collector::{BlankNodeContext, BlankNodeTripleSets, Collection, OntologyFormat, TripleCollector, TripleTypeCounts};
pub use model::{BlankNodeId, Node, Object, Statement, Triple};
