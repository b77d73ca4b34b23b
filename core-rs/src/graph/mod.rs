/**
 * graph module
 *
 * - store: GraphStore trait, vertex/edge records, edge definitions
 * - loader: statements → property graph with namespace allow-list
 * - memory: in-process store
 * - arango: ArangoDB HTTP store
 */

pub mod arango;
pub mod loader;
pub mod memory;
pub mod store;

pub use arango::ArangoStore;
pub use loader::{LoadReport, PropertyGraphLoader};
pub use memory::MemoryGraphStore;
pub use store::{edge_collection_name, edge_key, Attributes, EdgeDefinition, EdgeRecord, GraphStore, VertexRecord};
