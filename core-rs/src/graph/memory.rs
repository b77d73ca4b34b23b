/**
 * memory.rs
 * In-process GraphStore used by tests and dry runs
 */

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use super::store::{EdgeDefinition, EdgeRecord, GraphStore, VertexRecord};
use crate::errors::{KnError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    databases: BTreeSet<String>,
    graphs: BTreeSet<String>,
    vertices: BTreeMap<String, BTreeMap<String, VertexRecord>>,
    edges: BTreeMap<String, BTreeMap<String, EdgeRecord>>,
    definitions: BTreeMap<String, EdgeDefinition>,
}

#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    state: Mutex<MemoryState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn vertex(&self, collection: &str, key: &str) -> Option<VertexRecord> {
        self.state()
            .vertices
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned()
    }

    pub fn edge(&self, collection: &str, key: &str) -> Option<EdgeRecord> {
        self.state()
            .edges
            .get(collection)
            .and_then(|c| c.get(key))
            .cloned()
    }

    pub fn vertex_collections(&self) -> Vec<String> {
        self.state().vertices.keys().cloned().collect()
    }

    pub fn edge_collections(&self) -> Vec<String> {
        self.state().edges.keys().cloned().collect()
    }

    pub fn edge_definition(&self, collection: &str) -> Option<EdgeDefinition> {
        self.state().definitions.get(collection).cloned()
    }

    pub fn vertex_count(&self) -> usize {
        self.state().vertices.values().map(|c| c.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.state().edges.values().map(|c| c.len()).sum()
    }

    /// All vertices as `(collection, vertex)` in key order
    pub fn vertices(&self) -> Vec<(String, VertexRecord)> {
        let state = self.state();
        state
            .vertices
            .iter()
            .flat_map(|(name, c)| c.values().map(move |v| (name.clone(), v.clone())))
            .collect()
    }

    /// All edges as `(collection, edge)` in key order
    pub fn edges(&self) -> Vec<(String, EdgeRecord)> {
        let state = self.state();
        state
            .edges
            .iter()
            .flat_map(|(name, c)| c.values().map(move |e| (name.clone(), e.clone())))
            .collect()
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.state().databases.contains(name)
    }

    pub fn has_graph(&self, name: &str) -> bool {
        self.state().graphs.contains(name)
    }
}

impl GraphStore for MemoryGraphStore {
    fn create_or_get_database(&self, name: &str) -> Result<()> {
        self.state().databases.insert(name.to_string());
        Ok(())
    }

    fn create_or_get_graph(&self, name: &str) -> Result<()> {
        self.state().graphs.insert(name.to_string());
        Ok(())
    }

    fn ensure_vertex_collection(&self, name: &str) -> Result<()> {
        self.state().vertices.entry(name.to_string()).or_default();
        Ok(())
    }

    fn define_edge_collection(&self, definition: &EdgeDefinition) -> Result<()> {
        let mut state = self.state();
        state.edges.entry(definition.collection.clone()).or_default();
        state
            .definitions
            .insert(definition.collection.clone(), definition.clone());
        Ok(())
    }

    fn upsert_vertex(&self, collection: &str, vertex: &VertexRecord) -> Result<()> {
        let mut state = self.state();
        let docs = state
            .vertices
            .get_mut(collection)
            .ok_or_else(|| KnError::Store(format!("Vertex collection '{}' does not exist", collection)))?;

        match docs.get_mut(&vertex.key) {
            Some(existing) => existing
                .attributes
                .extend(vertex.attributes.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => {
                docs.insert(vertex.key.clone(), vertex.clone());
            }
        }
        Ok(())
    }

    fn upsert_edge(&self, collection: &str, edge: &EdgeRecord) -> Result<()> {
        let mut state = self.state();
        let docs = state
            .edges
            .get_mut(collection)
            .ok_or_else(|| KnError::Store(format!("Edge collection '{}' does not exist", collection)))?;

        match docs.get_mut(&edge.key) {
            Some(existing) => existing
                .attributes
                .extend(edge.attributes.iter().map(|(k, v)| (k.clone(), v.clone()))),
            None => {
                docs.insert(edge.key.clone(), edge.clone());
            }
        }
        Ok(())
    }
}
