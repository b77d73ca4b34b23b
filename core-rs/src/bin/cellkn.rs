//! cellkn - Cell KN ontology loader CLI
//!
//! Command-line interface for the ontology → property graph pipeline

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::Level;

use cellkn_core::graph::{ArangoStore, GraphStore, MemoryGraphStore};
use cellkn_core::pipeline::{convert_collection, Pipeline, PipelineConfig, RunReport, StoreKind};
use cellkn_core::term::{default_prefixes, LabelIndex};
use cellkn_core::triples::{Collection, TripleCollector};
use cellkn_core::CachedFetcher;

#[derive(Parser)]
#[command(name = "cellkn")]
#[command(version)]
#[command(about = "Load OBO ontologies and the Cell KN schema into a property graph", long_about = None)]
struct Cli {
    /// Debug-level logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: every ontology source, then the schema
    Load {
        /// Pipeline config file
        #[arg(long, short = 'c')]
        config: PathBuf,
        /// Load into an in-memory store instead of the configured one
        #[arg(long)]
        dry_run: bool,
    },
    /// Load only the schema
    Schema {
        #[arg(long, short = 'c')]
        config: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show triple-type counts for an ontology file
    Count {
        file: PathBuf,
    },
    /// Collect an ontology file and report blank-node resolution
    Resolve {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Load { config, dry_run } => handle_load(&config, dry_run, false),
        Commands::Schema { config, dry_run } => handle_load(&config, dry_run, true),
        Commands::Count { file } => handle_count(&file),
        Commands::Resolve { file } => handle_resolve(&file),
    }
}

fn open_store(config: &PipelineConfig, dry_run: bool) -> Result<Box<dyn GraphStore>> {
    let store = &config.spec.store;
    if dry_run || store.kind == StoreKind::Memory {
        return Ok(Box::new(MemoryGraphStore::new()));
    }
    let url = store.url.as_deref().context("spec.store.url is required for an arango store")?;
    Ok(Box::new(ArangoStore::new(url, &store.username, &store.resolved_password())?))
}

fn handle_load(config_path: &Path, dry_run: bool, schema_only: bool) -> Result<()> {
    let config = PipelineConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let store = open_store(&config, dry_run)?;
    let fetcher = CachedFetcher::new(config.spec.cache_dir.clone());

    let pipeline = Pipeline::new(&config, &fetcher, store.as_ref());
    let report = if schema_only { pipeline.run_schema()? } else { pipeline.run()? };

    print_run_report(&report);
    Ok(())
}

fn print_run_report(report: &RunReport) {
    println!("\n{} {}", "Pipeline".bold(), report.name);
    println!("{}", "-".repeat(72));
    println!(
        "{:<40} {:>8} {:>8} {:>8} {:>10}",
        "SOURCE", "VERTICES", "EDGES", "SKIPPED", "UNRESOLVED"
    );
    for source in &report.sources {
        let unresolved: usize = source.unresolved.values().sum();
        println!(
            "{:<40} {:>8} {:>8} {:>8} {:>10}",
            source.source, source.load.vertices, source.load.edges, source.load.skipped, unresolved
        );
    }
    if let Some(schema) = &report.schema {
        println!(
            "{:<40} {:>8} {:>8} {:>8} {:>10}",
            "schema", schema.load.vertices, schema.load.edges, schema.load.skipped, "-"
        );
        if schema.skipped_rows > 0 {
            println!("  {} schema rows skipped (missing relation)", schema.skipped_rows.to_string().yellow());
        }
    }
    println!("{}", "-".repeat(72));

    for source in &report.sources {
        println!("  {} {} triples: {}", source.source.dimmed(), source.counts.total, source.counts.shape_summary());
    }

    for failed in &report.failed {
        println!("{} {}: {}", "✗".red(), failed.source, failed.error);
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "{} {} vertices, {} edges, {} skipped, {} unresolved blank nodes in {}s",
        "✓".green(),
        report.total.vertices,
        report.total.edges,
        report.total.skipped,
        report.unresolved(),
        elapsed.num_seconds()
    );
}

fn collect(file: &Path) -> Result<Collection> {
    TripleCollector::collect_file(file).with_context(|| format!("Failed to collect {}", file.display()))
}

fn handle_count(file: &Path) -> Result<()> {
    let collection = collect(file)?;
    let counts = &collection.counts;

    println!("\n{} {}", "Triples".bold(), file.display());
    println!("  total:  {}", counts.total);
    println!("  filled: {}", collection.filled.len());
    println!("  blank nodes: {}", collection.blank_sets.len());

    println!("\n{}", "By shape".bold());
    for (shape, n) in &counts.by_shape {
        println!("  {:<24} {:>8}", shape, n);
    }

    println!("\n{}", "By predicate".bold());
    for (predicate, n) in &counts.by_predicate {
        println!("  {:<64} {:>8}", predicate, n);
    }
    Ok(())
}

fn handle_resolve(file: &Path) -> Result<()> {
    let collection = collect(file)?;
    let (statements, resolution) = convert_collection(&collection, &default_prefixes(), &LabelIndex::new());

    println!("\n{} {}", "Blank nodes".bold(), file.display());
    println!("  blank nodes: {}", collection.blank_sets.len());
    println!("  statements:  {}", statements.len());
    for (kind, n) in &resolution.resolved {
        println!("  {} {:?}: {}", "✓".green(), kind, n);
    }
    for (reason, n) in resolution.unresolved_by_reason() {
        println!("  {} {}: {}", "✗".red(), reason, n);
    }

    // Unresolved nodes grouped by the predicates they carry as subject
    let mut shapes: BTreeMap<String, usize> = BTreeMap::new();
    for id in resolution.unresolved.keys() {
        if let Some(ctx) = collection.blank_sets.get(id) {
            let mut predicates: Vec<&str> = ctx.as_subject.iter().map(|t| t.predicate.as_str()).collect();
            predicates.sort_unstable();
            predicates.dedup();
            *shapes.entry(predicates.join(" ")).or_insert(0) += 1;
        }
    }
    if !shapes.is_empty() {
        println!("\n{}", "Unresolved patterns".bold());
        for (shape, n) in &shapes {
            let shape = if shape.is_empty() { "(no outgoing triples)" } else { shape.as_str() };
            println!("  {:>6}  {}", n, shape);
        }
    }
    Ok(())
}
