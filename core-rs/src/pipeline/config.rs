/**
 * config.rs
 * Parser for pipeline configuration files (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: cellkn/v1
 * kind: Pipeline
 * metadata:
 *   name: cell-kn
 * spec:
 *   cacheDir: data/obo
 *   sources:
 *     - http://purl.obolibrary.org/obo/cl.owl
 *   relationsOntology: http://purl.obolibrary.org/obo/ro.owl
 *   validVertices: [CL, GO, UBERON]
 *   schema:
 *     schemaPath: data/schema.csv
 *     relationsPath: data/relations.csv
 *   store:
 *     kind: arango
 *     url: http://localhost:8529
 * ```
 */

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{KnError, Result};
use crate::term::{default_prefixes, PrefixMapping};

pub const API_VERSION: &str = "cellkn/v1";
pub const KIND: &str = "Pipeline";

/// Environment variable consulted when the store password is not configured
pub const PASSWORD_ENV: &str = "ARANGO_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: PipelineSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub name: String,
}

/// Extra base URL → prefix mapping (`prefix` omitted for OBO-style bases)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefixConfig {
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    pub schema_path: PathBuf,
    pub relations_path: PathBuf,
    /// Namespaces never added to the allow-list by the schema
    #[serde(default = "default_excluded_namespaces")]
    pub excluded_namespaces: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Arango,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_graph")]
    pub graph: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            url: None,
            username: default_username(),
            password: None,
            database: default_database(),
            graph: default_graph(),
        }
    }
}

impl StoreConfig {
    /// Configured password, else `ARANGO_PASSWORD`, else empty
    pub fn resolved_password(&self) -> String {
        self.password
            .clone()
            .or_else(|| env::var(PASSWORD_ENV).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations_ontology: Option<String>,
    pub valid_vertices: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<PrefixConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaConfig>,
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/obo")
}

fn default_excluded_namespaces() -> Vec<String> {
    vec!["BFO".to_string(), "IAO".to_string(), "RO".to_string()]
}

fn default_username() -> String {
    "root".to_string()
}

fn default_database() -> String {
    "cell-kn".to_string()
}

fn default_graph() -> String {
    "KN".to_string()
}

impl PipelineConfig {
    /// Load and validate a pipeline config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(KnError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content).map_err(|e| {
            KnError::ParseError(format!("Invalid pipeline config YAML: {}", e))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate config structure
    ///
    /// Ensures:
    /// - apiVersion is "cellkn/v1" and kind is "Pipeline"
    /// - metadata.name, spec.sources and spec.validVertices are non-empty
    /// - an arango store has a url
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(KnError::ValidationError(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(KnError::ValidationError(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        if self.metadata.name.is_empty() {
            return Err(KnError::ValidationError(
                "metadata.name cannot be empty".to_string(),
            ));
        }

        if self.spec.sources.is_empty() {
            return Err(KnError::ValidationError(
                "spec.sources cannot be empty".to_string(),
            ));
        }

        if self.spec.valid_vertices.is_empty() {
            return Err(KnError::ValidationError(
                "spec.validVertices cannot be empty".to_string(),
            ));
        }

        if self.spec.store.kind == StoreKind::Arango
            && self.spec.store.url.as_deref().map_or(true, str::is_empty)
        {
            return Err(KnError::ValidationError(
                "spec.store.url is required for an arango store".to_string(),
            ));
        }

        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    /// Minimal valid config with a memory store
    pub fn new(name: &str, sources: Vec<String>, valid_vertices: Vec<String>) -> Self {
        PipelineConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: Metadata {
                name: name.to_string(),
            },
            spec: PipelineSpec {
                cache_dir: default_cache_dir(),
                sources,
                relations_ontology: None,
                valid_vertices,
                prefixes: Vec::new(),
                schema: None,
                store: StoreConfig::default(),
            },
        }
    }

    /// Default prefix table followed by the configured extras
    pub fn prefix_mappings(&self) -> Vec<PrefixMapping> {
        let mut mappings = default_prefixes();
        for extra in &self.spec.prefixes {
            mappings.push(match &extra.prefix {
                Some(prefix) => PrefixMapping::named(extra.base.clone(), prefix.clone()),
                None => PrefixMapping::obo_style(extra.base.clone()),
            });
        }
        mappings
    }
}
