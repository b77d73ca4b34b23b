/**
 * loader.rs
 * Canonical statements → vertex collections per namespace, edge collections
 * per predicate
 */

use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::store::{edge_collection_name, EdgeDefinition, EdgeRecord, GraphStore, VertexRecord};
use crate::errors::Result;
use crate::term::Term;
use crate::triples::{Object, Statement};

const LABEL_PREDICATE: &str = "rdfs:label";
const LABEL_ATTRIBUTE: &str = "label";

/// Outcome of one `load` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub vertices: usize,
    pub edges: usize,
    pub attributes: usize,
    pub skipped: usize,
    /// Out-of-allow-list namespace → statements skipped because of it
    pub skipped_by_namespace: BTreeMap<String, usize>,
}

impl LoadReport {
    pub fn merge(&mut self, other: &LoadReport) {
        self.vertices += other.vertices;
        self.edges += other.edges;
        self.attributes += other.attributes;
        self.skipped += other.skipped;
        for (ns, n) in &other.skipped_by_namespace {
            *self.skipped_by_namespace.entry(ns.clone()).or_insert(0) += n;
        }
    }
}

#[derive(Debug)]
struct PendingVertex {
    term: Term,
    literals: BTreeMap<String, BTreeSet<String>>,
}

pub struct PropertyGraphLoader<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    valid_vertices: BTreeSet<String>,
    collections: BTreeSet<String>,
    definitions: BTreeMap<String, EdgeDefinition>,
}

impl<'a, S: GraphStore + ?Sized> PropertyGraphLoader<'a, S> {
    pub fn new<I, T>(store: &'a S, valid_vertices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            store,
            valid_vertices: valid_vertices.into_iter().map(Into::into).collect(),
            collections: BTreeSet::new(),
            definitions: BTreeMap::new(),
        }
    }

    /// Create (or open) the database and graph
    pub fn prepare(&self, database: &str, graph: &str) -> Result<()> {
        self.store.create_or_get_database(database)?;
        self.store.create_or_get_graph(graph)
    }

    pub fn is_allowed(&self, namespace: &str) -> bool {
        self.valid_vertices.contains(namespace)
    }

    pub fn valid_vertices(&self) -> &BTreeSet<String> {
        &self.valid_vertices
    }

    /// Add namespaces to the allow-list
    pub fn allow<I, T>(&mut self, namespaces: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.valid_vertices.extend(namespaces.into_iter().map(Into::into));
    }

    /// Load statements into the store
    ///
    /// A statement with an endpoint outside the allow-list is skipped and
    /// counted. Literal objects become attributes of the subject vertex keyed
    /// by the predicate label (or id). Store failures abort the load.
    pub fn load<'s, I>(&mut self, statements: I) -> Result<LoadReport>
    where
        I: IntoIterator<Item = &'s Statement>,
    {
        let mut report = LoadReport::default();
        let mut vertices: BTreeMap<String, PendingVertex> = BTreeMap::new();
        let mut edges: BTreeMap<(String, String), EdgeRecord> = BTreeMap::new();

        for statement in statements {
            let subject = &statement.subject;
            if !self.is_allowed(&subject.namespace) {
                skip(&mut report, &subject.namespace);
                continue;
            }

            match &statement.object {
                Object::Literal(value) => {
                    let name = attribute_name(&statement.predicate);
                    pending(&mut vertices, subject)
                        .literals
                        .entry(name)
                        .or_default()
                        .insert(value.clone());
                    report.attributes += 1;
                }
                Object::Term(object) => {
                    if !self.is_allowed(&object.namespace) {
                        skip(&mut report, &object.namespace);
                        continue;
                    }
                    pending(&mut vertices, subject);
                    pending(&mut vertices, object);

                    let collection = edge_collection_name(&statement.predicate.id);
                    self.define_edge(&collection, &subject.namespace, &object.namespace)?;
                    let edge = EdgeRecord::between(subject, object, &statement.predicate);
                    edges.insert((collection, edge.key.clone()), edge);
                }
            }
        }

        for vertex in vertices.values() {
            self.ensure_collection(&vertex.term.namespace)?;
            let mut record = VertexRecord::from_term(&vertex.term);
            for (name, values) in &vertex.literals {
                record.attributes.insert(name.clone(), attribute_value(values));
            }
            self.store.upsert_vertex(&vertex.term.namespace, &record)?;
        }
        report.vertices = vertices.len();

        for ((collection, _), edge) in &edges {
            self.store.upsert_edge(collection, edge)?;
        }
        report.edges = edges.len();

        info!(
            "[PropertyGraphLoader] Loaded {} vertices, {} edges, {} attributes ({} skipped)",
            report.vertices, report.edges, report.attributes, report.skipped
        );
        Ok(report)
    }

    fn ensure_collection(&mut self, name: &str) -> Result<()> {
        if self.collections.insert(name.to_string()) {
            debug!("[PropertyGraphLoader] Vertex collection {}", name);
            self.store.ensure_vertex_collection(name)?;
        }
        Ok(())
    }

    fn define_edge(&mut self, collection: &str, from: &str, to: &str) -> Result<()> {
        let definition = self
            .definitions
            .entry(collection.to_string())
            .or_insert_with(|| EdgeDefinition::new(collection));
        if definition.extend(from, to) {
            debug!(
                "[PropertyGraphLoader] Edge collection {}: {:?} -> {:?}",
                collection, definition.from, definition.to
            );
            let definition = definition.clone();
            self.ensure_collection(from)?;
            self.ensure_collection(to)?;
            self.store.define_edge_collection(&definition)?;
        }
        Ok(())
    }
}

fn skip(report: &mut LoadReport, namespace: &str) {
    report.skipped += 1;
    *report
        .skipped_by_namespace
        .entry(namespace.to_string())
        .or_insert(0) += 1;
}

fn pending<'v>(vertices: &'v mut BTreeMap<String, PendingVertex>, term: &Term) -> &'v mut PendingVertex {
    vertices.entry(term.id.clone()).or_insert_with(|| PendingVertex {
        term: term.clone(),
        literals: BTreeMap::new(),
    })
}

/// `rdfs:label` literals share the vertex `label` attribute
fn attribute_name(predicate: &Term) -> String {
    if predicate.id == LABEL_PREDICATE {
        LABEL_ATTRIBUTE.to_string()
    } else {
        predicate.display_name().to_string()
    }
}

/// One value as a string, several as a sorted array
fn attribute_value(values: &BTreeSet<String>) -> JsonValue {
    if values.len() == 1 {
        json!(values.iter().next())
    } else {
        json!(values.iter().collect::<Vec<_>>())
    }
}
