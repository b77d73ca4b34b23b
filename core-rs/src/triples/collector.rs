/**
 * collector.rs
 * Parse an ontology source into filled triples and blank-node triple sets
 */

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{Subject, Term as RdfTerm};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{KnError, Result};
use crate::triples::model::{BlankNodeId, Node, Triple};

/// Serializations the collector can read, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OntologyFormat {
    RdfXml,
    Turtle,
    NTriples,
}

impl OntologyFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "owl" | "rdf" | "xml" => Ok(OntologyFormat::RdfXml),
            "ttl" => Ok(OntologyFormat::Turtle),
            "nt" => Ok(OntologyFormat::NTriples),
            _ => Err(KnError::UnsupportedFormat(format!(
                "{} (expected .owl, .rdf, .xml, .ttl or .nt)",
                path.display()
            ))),
        }
    }

    fn rdf_format(self) -> RdfFormat {
        match self {
            OntologyFormat::RdfXml => RdfFormat::RdfXml,
            OntologyFormat::Turtle => RdfFormat::Turtle,
            OntologyFormat::NTriples => RdfFormat::NTriples,
        }
    }
}

/// Every triple a blank node takes part in, split by role
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlankNodeContext {
    /// Triples describing the blank node's own properties
    pub as_subject: Vec<Triple>,
    /// Triples pointing at the blank node
    pub as_object: Vec<Triple>,
}

impl BlankNodeContext {
    /// Objects of `predicate` where this blank node is the subject
    pub fn objects<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.as_subject
            .iter()
            .filter(move |t| t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// `(subject iri, predicate)` of every concrete term referring to this node
    pub fn concrete_referrers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.as_object.iter().filter_map(|t| match &t.subject {
            Node::Iri(subject) => Some((subject.as_str(), t.predicate.as_str())),
            _ => None,
        })
    }

    pub fn has_blank_referrer(&self) -> bool {
        self.as_object.iter().any(|t| t.subject.is_blank())
    }
}

/// Blank node → its complete local context
///
/// Every blank node referenced by the collected triples is a key exactly once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BlankNodeTripleSets {
    sets: BTreeMap<BlankNodeId, BlankNodeContext>,
}

impl BlankNodeTripleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a blank-touching triple under each blank node it references
    pub fn record(&mut self, triple: &Triple) {
        if let Node::Blank(id) = &triple.subject {
            self.sets.entry(id.clone()).or_default().as_subject.push(triple.clone());
        }
        if let Node::Blank(id) = &triple.object {
            self.sets.entry(id.clone()).or_default().as_object.push(triple.clone());
        }
    }

    pub fn get(&self, id: &BlankNodeId) -> Option<&BlankNodeContext> {
        self.sets.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlankNodeId, &BlankNodeContext)> {
        self.sets.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlankNodeId> {
        self.sets.keys()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl FromIterator<(BlankNodeId, BlankNodeContext)> for BlankNodeTripleSets {
    fn from_iter<I: IntoIterator<Item = (BlankNodeId, BlankNodeContext)>>(iter: I) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

/// Diagnostic triple counts for coverage reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripleTypeCounts {
    pub total: usize,
    pub by_predicate: BTreeMap<String, usize>,
    pub by_shape: BTreeMap<String, usize>,
}

impl TripleTypeCounts {
    pub fn count(&mut self, triple: &Triple) {
        self.total += 1;
        *self.by_predicate.entry(triple.predicate.clone()).or_insert(0) += 1;
        *self.by_shape.entry(triple.shape()).or_insert(0) += 1;
    }

    /// `shape=count` pairs in shape order, e.g. `blank-iri-iri=4, iri-iri-literal=3`
    pub fn shape_summary(&self) -> String {
        self.by_shape
            .iter()
            .map(|(shape, n)| format!("{}={}", shape, n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn merge(&mut self, other: &TripleTypeCounts) {
        self.total += other.total;
        for (k, v) in &other.by_predicate {
            *self.by_predicate.entry(k.clone()).or_insert(0) += v;
        }
        for (k, v) in &other.by_shape {
            *self.by_shape.entry(k.clone()).or_insert(0) += v;
        }
    }
}

/// Collector output for one ontology source
#[derive(Debug, Clone, Default, Serialize)]
pub struct Collection {
    pub source: String,
    pub filled: BTreeSet<Triple>,
    pub blank_sets: BlankNodeTripleSets,
    pub counts: TripleTypeCounts,
}

impl Collection {
    /// Filled triples plus every blank-touching triple, deduplicated
    pub fn all_triples(&self) -> BTreeSet<&Triple> {
        let mut all: BTreeSet<&Triple> = self.filled.iter().collect();
        for (_, ctx) in self.blank_sets.iter() {
            all.extend(ctx.as_subject.iter());
            all.extend(ctx.as_object.iter());
        }
        all
    }
}

/// Single-pass triple collector
pub struct TripleCollector;

impl TripleCollector {
    /// Collect an ontology file; format comes from the extension
    pub fn collect_file(path: &Path) -> Result<Collection> {
        if !path.exists() {
            return Err(KnError::FileNotFound(path.display().to_string()));
        }

        let format = OntologyFormat::from_path(path)?;
        info!("[TripleCollector] Parsing {}", path.display());

        let file = File::open(path)?;
        let collection = Self::collect_reader(BufReader::new(file), format, &path.display().to_string())?;

        info!(
            "[TripleCollector] {} triples: {} filled, {} blank nodes",
            collection.counts.total,
            collection.filled.len(),
            collection.blank_sets.len()
        );

        Ok(collection)
    }

    /// Collect from any reader holding an RDF serialization
    pub fn collect_reader<R: Read>(reader: R, format: OntologyFormat, source: &str) -> Result<Collection> {
        let triples = Self::parse_reader(reader, format, source)?;
        Ok(Self::collect(triples, source))
    }

    /// Parse into raw triples without classifying them
    pub fn parse_reader<R: Read>(reader: R, format: OntologyFormat, source: &str) -> Result<Vec<Triple>> {
        let parser = RdfParser::from_format(format.rdf_format()).for_reader(reader);
        let mut triples = Vec::new();

        for quad in parser {
            let quad = quad.map_err(|e| KnError::OntologyParse {
                path: source.to_string(),
                message: e.to_string(),
            })?;

            let subject = match quad.subject {
                Subject::NamedNode(n) => Node::Iri(n.into_string()),
                Subject::BlankNode(b) => Node::Blank(BlankNodeId::new(b.as_str())),
                #[allow(unreachable_patterns)]
                other => {
                    debug!("[TripleCollector] Skipping unsupported subject {}", other);
                    continue;
                }
            };

            let object = match quad.object {
                RdfTerm::NamedNode(n) => Node::Iri(n.into_string()),
                RdfTerm::BlankNode(b) => Node::Blank(BlankNodeId::new(b.as_str())),
                RdfTerm::Literal(l) => Node::Literal(l.value().to_string()),
                #[allow(unreachable_patterns)]
                other => {
                    debug!("[TripleCollector] Skipping unsupported object {}", other);
                    continue;
                }
            };

            triples.push(Triple::new(subject, quad.predicate.into_string(), object));
        }

        Ok(triples)
    }

    /// Classify triples into filled and blank-touching, deduplicating
    /// structurally equal statements
    pub fn collect<I>(triples: I, source: &str) -> Collection
    where
        I: IntoIterator<Item = Triple>,
    {
        let mut collection = Collection {
            source: source.to_string(),
            ..Collection::default()
        };
        let mut blank_seen: HashSet<Triple> = HashSet::new();

        for triple in triples {
            if triple.is_filled() {
                if collection.filled.contains(&triple) {
                    continue;
                }
                collection.counts.count(&triple);
                collection.filled.insert(triple);
            } else {
                if blank_seen.contains(&triple) {
                    continue;
                }
                collection.counts.count(&triple);
                collection.blank_sets.record(&triple);
                blank_seen.insert(triple);
            }
        }

        collection
    }
}
