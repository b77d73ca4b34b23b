/**
 * pipeline module
 *
 * Runs configured ontology sources in order, then the schema, through
 * collection → blank-node resolution → property-graph load.
 *
 * - config: YAML pipeline configuration
 */

pub mod config;

pub use config::{Metadata, PipelineConfig, PipelineSpec, PrefixConfig, SchemaConfig, StoreConfig, StoreKind};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::errors::{KnError, Result};
use crate::fetch::OntologyFetcher;
use crate::graph::{GraphStore, LoadReport, PropertyGraphLoader};
use crate::schema::{read_relation_rows, read_schema_rows, RelationTable, SchemaTripleBuilder};
use crate::term::{LabelIndex, PrefixMapping, TermResolver, UNKNOWN_NAMESPACE};
use crate::triples::{
    resolve_blank_nodes, Collection, PatternKind, Resolution, Statement, TripleCollector, TripleTypeCounts,
    UnresolvedReason,
};

/// Per-source outcome
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub path: PathBuf,
    pub counts: TripleTypeCounts,
    pub filled: usize,
    pub blank_nodes: usize,
    pub resolved: BTreeMap<PatternKind, usize>,
    pub unresolved: BTreeMap<UnresolvedReason, usize>,
    pub statements: usize,
    pub load: LoadReport,
}

/// Source that could not be fetched or parsed
#[derive(Debug, Clone, Serialize)]
pub struct FailedSource {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    pub rows: usize,
    pub statements: usize,
    pub skipped_rows: usize,
    /// Namespaces the schema added to the allow-list
    pub added_namespaces: BTreeSet<String>,
    pub load: LoadReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub failed: Vec<FailedSource>,
    pub schema: Option<SchemaReport>,
    pub total: LoadReport,
}

impl RunReport {
    fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            started_at: now,
            finished_at: now,
            sources: Vec::new(),
            failed: Vec::new(),
            schema: None,
            total: LoadReport::default(),
        }
    }

    pub fn unresolved(&self) -> usize {
        self.sources.iter().flat_map(|s| s.unresolved.values()).sum()
    }
}

/// Resolve one collection into statements: filled triples, then resolved blank nodes
///
/// The label index is built from the collection itself and falls back to
/// `seed` (relation ontology labels).
pub fn convert_collection(
    collection: &Collection,
    prefixes: &[PrefixMapping],
    seed: &LabelIndex,
) -> (Vec<Statement>, Resolution) {
    let mut labels = LabelIndex::from_triples(collection.filled.iter(), prefixes);
    labels.merge(seed);
    let terms = TermResolver::new(prefixes.to_vec(), labels);

    let mut statements = Vec::with_capacity(collection.filled.len());
    for triple in &collection.filled {
        match Statement::from_triple(triple, &terms) {
            Ok(statement) => statements.push(statement),
            Err(e) => warn!("[Pipeline] Dropping {}: {}", triple, e),
        }
    }

    let resolution = resolve_blank_nodes(&collection.blank_sets, &terms);
    statements.extend(resolution.statements.iter().cloned());
    (statements, resolution)
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    fetcher: &'a dyn OntologyFetcher,
    store: &'a dyn GraphStore,
    prefixes: Vec<PrefixMapping>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, fetcher: &'a dyn OntologyFetcher, store: &'a dyn GraphStore) -> Self {
        Self {
            config,
            fetcher,
            store,
            prefixes: config.prefix_mappings(),
        }
    }

    /// Every source in order, then the schema
    ///
    /// A source that cannot be fetched or parsed is recorded and skipped.
    /// Store failures abort the run.
    pub fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::new(&self.config.metadata.name);
        let mut loader = self.open_loader()?;
        let seed = self.relation_labels(&mut report);

        for source in &self.config.spec.sources {
            let (path, collection) = match self.fetch_and_collect(source) {
                Ok(found) => found,
                Err(e) => {
                    warn!("[Pipeline] Skipping {}: {}", source, e);
                    report.failed.push(FailedSource {
                        source: source.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            info!(
                "[Pipeline] {}: {} triples ({})",
                source,
                collection.counts.total,
                collection.counts.shape_summary()
            );

            let (statements, resolution) = convert_collection(&collection, &self.prefixes, &seed);
            let load = loader.load(&statements)?;
            report.total.merge(&load);

            let unresolved = resolution.unresolved_by_reason();
            if !unresolved.is_empty() {
                warn!(
                    "[Pipeline] {}: {} unresolved blank nodes {:?}",
                    source,
                    resolution.unresolved.len(),
                    unresolved
                );
            }

            report.sources.push(SourceReport {
                source: source.clone(),
                path,
                filled: collection.filled.len(),
                blank_nodes: collection.blank_sets.len(),
                counts: collection.counts,
                resolved: resolution.resolved,
                unresolved,
                statements: statements.len(),
                load,
            });
        }

        if self.config.spec.schema.is_some() {
            let schema = self.load_schema(&mut loader, &seed)?;
            report.total.merge(&schema.load);
            report.schema = Some(schema);
        }

        report.finished_at = Utc::now();
        info!(
            "[Pipeline] {} finished: {} sources loaded, {} failed, {} vertices, {} edges, {} skipped",
            report.name,
            report.sources.len(),
            report.failed.len(),
            report.total.vertices,
            report.total.edges,
            report.total.skipped
        );
        Ok(report)
    }

    /// Schema stage only
    pub fn run_schema(&self) -> Result<RunReport> {
        let mut report = RunReport::new(&self.config.metadata.name);
        let mut loader = self.open_loader()?;
        let seed = self.relation_labels(&mut report);

        let schema = self.load_schema(&mut loader, &seed)?;
        report.total.merge(&schema.load);
        report.schema = Some(schema);
        report.finished_at = Utc::now();
        Ok(report)
    }

    fn open_loader(&self) -> Result<PropertyGraphLoader<'a, dyn GraphStore + 'a>> {
        let loader = PropertyGraphLoader::new(self.store, self.config.spec.valid_vertices.iter().cloned());
        let store = &self.config.spec.store;
        loader.prepare(&store.database, &store.graph)?;
        Ok(loader)
    }

    fn fetch_and_collect(&self, source: &str) -> Result<(PathBuf, Collection)> {
        let path = self.fetcher.fetch(source)?;
        let collection = TripleCollector::collect_file(&path)?;
        Ok((path, collection))
    }

    /// Labels from the relation ontology, empty when unset or unreadable
    fn relation_labels(&self, report: &mut RunReport) -> LabelIndex {
        let Some(source) = &self.config.spec.relations_ontology else {
            return LabelIndex::new();
        };

        match self.fetch_and_collect(source) {
            Ok((_, collection)) => {
                let labels = LabelIndex::from_triples(collection.filled.iter(), &self.prefixes);
                info!("[Pipeline] {} relation labels from {}", labels.len(), source);
                labels
            }
            Err(e) => {
                warn!("[Pipeline] Relation ontology {} unavailable: {}", source, e);
                report.failed.push(FailedSource {
                    source: source.clone(),
                    error: e.to_string(),
                });
                LabelIndex::new()
            }
        }
    }

    fn load_schema(&self, loader: &mut PropertyGraphLoader<'a, dyn GraphStore + 'a>, seed: &LabelIndex) -> Result<SchemaReport> {
        let Some(config) = &self.config.spec.schema else {
            return Err(KnError::ValidationError(
                "spec.schema is not configured".to_string(),
            ));
        };

        let rows = read_schema_rows(&config.schema_path)?;
        let relations = RelationTable::from_rows(&read_relation_rows(&config.relations_path)?);
        if relations.is_empty() {
            return Err(KnError::Schema(format!(
                "{} has no relation with a CURIE",
                config.relations_path.display()
            )));
        }
        let terms = TermResolver::new(self.prefixes.clone(), seed.clone());
        let built = SchemaTripleBuilder::new(&relations, &terms).build(&rows);

        let added_namespaces: BTreeSet<String> = built
            .referenced_namespaces
            .iter()
            .filter(|ns| ns.as_str() != UNKNOWN_NAMESPACE)
            .filter(|ns| !config.excluded_namespaces.contains(*ns))
            .filter(|ns| !loader.is_allowed(ns))
            .cloned()
            .collect();
        if !added_namespaces.is_empty() {
            info!("[Pipeline] Schema adds vertex namespaces {:?}", added_namespaces);
            loader.allow(added_namespaces.iter().cloned());
        }

        let load = loader.load(&built.statements)?;
        Ok(SchemaReport {
            rows: rows.len(),
            statements: built.statements.len(),
            skipped_rows: built.skipped.len(),
            added_namespaces,
            load,
        })
    }
}
