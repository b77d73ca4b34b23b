/**
 * builder.rs
 * Schema rows → canonical statements with synthetic label statements
 */

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::reader::{RelationRow, SchemaRow};
use crate::term::{vocab, Term, TermResolver};
use crate::triples::{Object, Statement};

const CLASS_SUFFIX: &str = "_class";

/// Schema name with surrounding whitespace and a trailing `_class` removed
pub fn normalize_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix(CLASS_SUFFIX).unwrap_or(name)
}

/// Expand a schema CURIE into a URI
///
/// `rdf:type` and `rdfs:subClassOf` map to their W3C URIs, everything else
/// is treated as an OBO identifier.
pub fn curie_to_uri(curie: &str) -> String {
    match curie.trim() {
        "rdf:type" => vocab::RDF_TYPE.to_string(),
        "rdfs:subClassOf" => vocab::RDFS_SUBCLASS_OF.to_string(),
        other => format!("{}{}", vocab::OBO, other.replace(':', "_")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEntry {
    pub label: Option<String>,
    pub curie: String,
}

/// Schema name → (label, CURIE), keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct RelationTable {
    entries: BTreeMap<String, RelationEntry>,
}

impl RelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later rows with the same normalized name are ignored
    pub fn from_rows(rows: &[RelationRow]) -> Self {
        let mut table = Self::new();
        for row in rows {
            let label = row
                .label
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            table.insert(&row.name, label, &row.curie);
        }
        table
    }

    pub fn insert(&mut self, name: &str, label: Option<String>, curie: &str) {
        let curie = curie.trim();
        if curie.is_empty() {
            debug!("[SchemaTripleBuilder] Relation '{}' has no CURIE, ignored", name);
            return;
        }
        self.entries
            .entry(normalize_name(name).to_string())
            .or_insert_with(|| RelationEntry {
                label,
                curie: curie.to_string(),
            });
    }

    pub fn get(&self, name: &str) -> Option<&RelationEntry> {
        self.entries.get(normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Schema row that produced no statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: SchemaRow,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaTriples {
    pub statements: Vec<Statement>,
    /// Subject and object namespaces of every built row
    pub referenced_namespaces: BTreeSet<String>,
    pub skipped: Vec<SkippedRow>,
}

pub struct SchemaTripleBuilder<'a> {
    relations: &'a RelationTable,
    terms: &'a TermResolver,
}

impl<'a> SchemaTripleBuilder<'a> {
    pub fn new(relations: &'a RelationTable, terms: &'a TermResolver) -> Self {
        Self { relations, terms }
    }

    /// Convert schema rows in order
    ///
    /// Per row: subject label, object label, then the row statement. A row
    /// with any name missing from the relation table emits nothing.
    pub fn build(&self, rows: &[SchemaRow]) -> SchemaTriples {
        let mut out = SchemaTriples::default();
        let label_predicate = self.terms.resolve(vocab::RDFS_LABEL);

        for row in rows {
            let names = [&row.subject, &row.predicate, &row.object];
            let missing: Vec<String> = names
                .iter()
                .filter(|n| self.relations.get(n).is_none())
                .map(|n| n.trim().to_string())
                .collect();

            if !missing.is_empty() {
                warn!(
                    "[SchemaTripleBuilder] Skipping row ({}, {}, {}): no relation for {}",
                    row.subject,
                    row.predicate,
                    row.object,
                    missing.join(", ")
                );
                out.skipped.push(SkippedRow {
                    row: row.clone(),
                    missing,
                });
                continue;
            }

            let (Some((subject, subject_label)), Some((predicate, _)), Some((object, object_label))) = (
                self.term_for(&row.subject),
                self.term_for(&row.predicate),
                self.term_for(&row.object),
            ) else {
                continue;
            };

            // Label statements come from the relation table only
            for (term, label) in [(&subject, subject_label), (&object, object_label)] {
                if let Some(label) = label {
                    out.statements.push(Statement::new(
                        term.clone(),
                        label_predicate.clone(),
                        Object::Literal(label),
                    ));
                }
            }

            for term in [&subject, &object] {
                out.referenced_namespaces.insert(term.namespace.clone());
            }

            out.statements
                .push(Statement::new(subject, predicate, Object::Term(object)));
        }

        debug!(
            "[SchemaTripleBuilder] {} statements from {} rows ({} skipped)",
            out.statements.len(),
            rows.len(),
            out.skipped.len()
        );
        out
    }

    /// Schema term plus the label the relation table gives it, if any
    fn term_for(&self, name: &str) -> Option<(Term, Option<String>)> {
        let entry = self.relations.get(name)?;
        let uri = curie_to_uri(&entry.curie);
        let term = self.terms.resolve(&uri).as_schema_term(entry.label.clone());
        Some((term, entry.label.clone()))
    }
}
