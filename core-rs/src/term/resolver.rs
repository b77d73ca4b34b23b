//! Term resolver: URI/CURIE → canonical id, label, namespace
//!
//! A resolver is an explicit context object. It owns the prefix table, the
//! label index for one ontology file (optionally seeded with relation
//! ontology labels) and an append-only cache keyed by URI. Nothing here is
//! process-global; callers create one resolver per file or per run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::term::model::{Source, Term, UNKNOWN_NAMESPACE};
use crate::term::vocab;
use crate::triples::{Node, Triple};

/// OBO-style local part: `PREFIX_LOCAL`
static OBO_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9]*)_([^/#]+)$").expect("valid OBO local-part pattern")
});

/// Already compact identifier: `PREFIX:LOCAL`
static CURIE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_.-]*):([^/\s]+)$").expect("valid CURIE pattern")
});

/// Base URL → prefix mapping
///
/// When `prefix` is absent the mapping is OBO style: the local part itself
/// carries the prefix (`UBERON_0002048` → `UBERON:0002048`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixMapping {
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl PrefixMapping {
    pub fn obo_style(base: impl Into<String>) -> Self {
        Self { base: base.into(), prefix: None }
    }

    pub fn named(base: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            prefix: Some(prefix.into()),
        }
    }

    /// Canonical `(id, namespace)` if `uri` starts with this base
    fn apply(&self, uri: &str) -> Option<(String, String)> {
        let local = uri.strip_prefix(self.base.as_str())?;
        if local.is_empty() {
            return None;
        }

        match &self.prefix {
            Some(prefix) => Some((format!("{}:{}", prefix, local), prefix.clone())),
            None => {
                let caps = OBO_LOCAL.captures(local)?;
                let prefix = caps.get(1)?.as_str();
                let id = caps.get(2)?.as_str();
                Some((format!("{}:{}", prefix, id), prefix.to_string()))
            }
        }
    }
}

/// Prefix table used when the configuration does not override it
pub fn default_prefixes() -> Vec<PrefixMapping> {
    vec![
        PrefixMapping::obo_style(vocab::OBO),
        PrefixMapping::obo_style("http://www.ebi.ac.uk/efo/"),
        PrefixMapping::named(vocab::RDF, "rdf"),
        PrefixMapping::named(vocab::RDFS, "rdfs"),
        PrefixMapping::named(vocab::OWL, "owl"),
        PrefixMapping::named(vocab::XSD, "xsd"),
        PrefixMapping::named(vocab::OBO_IN_OWL, "oboInOwl"),
        PrefixMapping::named("http://purl.org/dc/elements/1.1/", "dc"),
        PrefixMapping::named("http://purl.org/dc/terms/", "dcterms"),
        PrefixMapping::named("http://www.w3.org/2004/02/skos/core#", "skos"),
    ]
}

/// Canonical `(id, namespace)` for a URI or CURIE, `None` if nothing matches
pub fn canonical_id(uri: &str, prefixes: &[PrefixMapping]) -> Option<(String, String)> {
    // Longest base wins so nested bases (obo/ vs obo/uberon/) stay distinct
    let mut best: Option<(&PrefixMapping, (String, String))> = None;
    for mapping in prefixes {
        if let Some(hit) = mapping.apply(uri) {
            let longer = best
                .as_ref()
                .map_or(true, |(current, _)| mapping.base.len() > current.base.len());
            if longer {
                best = Some((mapping, hit));
            }
        }
    }

    if let Some((_, hit)) = best {
        return Some(hit);
    }

    if uri.contains("://") {
        return None;
    }

    CURIE
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|prefix| (uri.to_string(), prefix.as_str().to_string()))
}

/// Canonical id → label, built from `rdfs:label` literal triples
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    labels: BTreeMap<String, String>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every `(iri, rdfs:label, literal)` triple
    ///
    /// The first label seen for an id is kept; feed triples in a stable
    /// order for a deterministic index.
    pub fn from_triples<'a, I>(triples: I, prefixes: &[PrefixMapping]) -> Self
    where
        I: IntoIterator<Item = &'a Triple>,
    {
        let mut index = Self::new();
        index.extend_from_triples(triples, prefixes);
        index
    }

    pub fn extend_from_triples<'a, I>(&mut self, triples: I, prefixes: &[PrefixMapping])
    where
        I: IntoIterator<Item = &'a Triple>,
    {
        for triple in triples {
            if triple.predicate != vocab::RDFS_LABEL {
                continue;
            }
            if let (Node::Iri(subject), Node::Literal(label)) = (&triple.subject, &triple.object) {
                let id = canonical_id(subject, prefixes)
                    .map(|(id, _)| id)
                    .unwrap_or_else(|| subject.clone());
                self.labels.entry(id).or_insert_with(|| label.clone());
            }
        }
    }

    /// Add entries from another index without replacing existing labels
    pub fn merge(&mut self, other: &LabelIndex) {
        for (id, label) in &other.labels {
            self.labels.entry(id.clone()).or_insert_with(|| label.clone());
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.entry(id.into()).or_insert_with(|| label.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Resolution context for one ontology file (or one run)
pub struct TermResolver {
    prefixes: Vec<PrefixMapping>,
    labels: LabelIndex,
    cache: RwLock<HashMap<String, Term>>,
}

impl Default for TermResolver {
    fn default() -> Self {
        Self::new(default_prefixes(), LabelIndex::new())
    }
}

impl TermResolver {
    pub fn new(prefixes: Vec<PrefixMapping>, labels: LabelIndex) -> Self {
        Self {
            prefixes,
            labels,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a URI (or CURIE) to a term
    ///
    /// Never fails: an unrecognized URI becomes its own id with no label and
    /// the `unknown` namespace.
    pub fn resolve(&self, uri: &str) -> Term {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(term) = cache.get(uri) {
                return term.clone();
            }
        }

        let term = match canonical_id(uri, &self.prefixes) {
            Some((id, namespace)) => {
                let label = self.labels.get(&id).map(|s| s.to_string());
                Term::new(id, label, namespace, Source::Obo)
            }
            None => {
                let label = self.labels.get(uri).map(|s| s.to_string());
                Term::new(uri, label, UNKNOWN_NAMESPACE, Source::Obo)
            }
        };

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.entry(uri.to_string()).or_insert(term).clone()
    }

    /// Expand a CURIE against the prefix table (`CL:0000000` → OBO URI)
    pub fn expand_curie(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        for mapping in &self.prefixes {
            match &mapping.prefix {
                Some(p) if p == prefix => return Some(format!("{}{}", mapping.base, local)),
                _ => {}
            }
        }
        None
    }

    pub fn prefixes(&self) -> &[PrefixMapping] {
        &self.prefixes
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    /// Number of distinct URIs resolved so far
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
