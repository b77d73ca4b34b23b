/**
 * arango.rs
 * GraphStore over the ArangoDB HTTP API
 *
 * Upserts use `overwriteMode=update`. Creating a database, graph or
 * collection that already exists is not an error.
 */

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info};

use super::store::{EdgeDefinition, EdgeRecord, GraphStore, VertexRecord};
use crate::errors::{KnError, Result};

/// ArangoDB error numbers meaning "already exists"
const ALREADY_EXISTS: &[u64] = &[
    1207, // duplicate collection or database name
    1920, // collection already used in an edge definition
    1925, // graph already exists
    1938, // collection already used as orphan
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ArangoStore {
    base_url: String,
    username: String,
    password: String,
    client: Client,
    database: RwLock<Option<String>>,
    graph: RwLock<Option<String>>,
}

impl ArangoStore {
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            client,
            database: RwLock::new(None),
            graph: RwLock::new(None),
        })
    }

    fn database(&self) -> Result<String> {
        self.database
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| KnError::Store("No database selected".to_string()))
    }

    fn graph(&self) -> Result<String> {
        self.graph
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| KnError::Store("No graph selected".to_string()))
    }

    fn db_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}/_db/{}{}", self.base_url, self.database()?, path))
    }

    fn post(&self, url: &str, body: &JsonValue) -> Result<Response> {
        debug!("[ArangoStore] POST {}", url);
        Ok(self
            .client
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()?)
    }

    fn put(&self, url: &str, body: &JsonValue) -> Result<Response> {
        debug!("[ArangoStore] PUT {}", url);
        Ok(self
            .client
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()?)
    }

    /// Create something; an "already exists" answer counts as success
    fn create(&self, url: &str, body: &JsonValue, what: &str) -> Result<bool> {
        let response = self.post(url, body)?;
        let status = response.status();
        if status.is_success() {
            info!("[ArangoStore] Created {}", what);
            return Ok(true);
        }

        let body: JsonValue = response.json().unwrap_or(JsonValue::Null);
        if is_already_exists(status, &body) {
            debug!("[ArangoStore] {} already exists", what);
            return Ok(false);
        }
        Err(store_error(what, status, &body))
    }

    fn upsert(&self, collection: &str, document: &JsonValue, what: &str) -> Result<()> {
        let url = self.db_url(&format!("/_api/document/{}?overwriteMode=update", collection))?;
        let response = self.post(&url, document)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body: JsonValue = response.json().unwrap_or(JsonValue::Null);
        Err(store_error(what, status, &body))
    }
}

fn is_already_exists(status: StatusCode, body: &JsonValue) -> bool {
    if status == StatusCode::CONFLICT {
        return true;
    }
    body.get("errorNum")
        .and_then(JsonValue::as_u64)
        .map(|n| ALREADY_EXISTS.contains(&n))
        .unwrap_or(false)
}

fn store_error(what: &str, status: StatusCode, body: &JsonValue) -> KnError {
    let message = body
        .get("errorMessage")
        .and_then(JsonValue::as_str)
        .unwrap_or("no error message");
    KnError::Store(format!("{} failed ({}): {}", what, status, message))
}

fn definition_body(definition: &EdgeDefinition) -> JsonValue {
    json!({
        "collection": definition.collection,
        "from": definition.from,
        "to": definition.to,
    })
}

impl GraphStore for ArangoStore {
    fn create_or_get_database(&self, name: &str) -> Result<()> {
        let url = format!("{}/_db/_system/_api/database", self.base_url);
        self.create(&url, &json!({ "name": name }), &format!("database {}", name))?;
        *self.database.write().unwrap_or_else(|e| e.into_inner()) = Some(name.to_string());
        Ok(())
    }

    fn create_or_get_graph(&self, name: &str) -> Result<()> {
        let url = self.db_url("/_api/gharial")?;
        self.create(
            &url,
            &json!({ "name": name, "edgeDefinitions": [] }),
            &format!("graph {}", name),
        )?;
        *self.graph.write().unwrap_or_else(|e| e.into_inner()) = Some(name.to_string());
        Ok(())
    }

    fn ensure_vertex_collection(&self, name: &str) -> Result<()> {
        let url = self.db_url(&format!("/_api/gharial/{}/vertex", self.graph()?))?;
        self.create(&url, &json!({ "collection": name }), &format!("vertex collection {}", name))?;
        Ok(())
    }

    fn define_edge_collection(&self, definition: &EdgeDefinition) -> Result<()> {
        let graph = self.graph()?;
        let body = definition_body(definition);
        let what = format!("edge collection {}", definition.collection);

        let url = self.db_url(&format!("/_api/gharial/{}/edge", graph))?;
        if self.create(&url, &body, &what)? {
            return Ok(());
        }

        // Existing definition: replace it with the extended from/to sets
        let url = self.db_url(&format!("/_api/gharial/{}/edge/{}", graph, definition.collection))?;
        let response = self.put(&url, &body)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body: JsonValue = response.json().unwrap_or(JsonValue::Null);
        Err(store_error(&what, status, &body))
    }

    fn upsert_vertex(&self, collection: &str, vertex: &VertexRecord) -> Result<()> {
        let document = serde_json::to_value(vertex)?;
        self.upsert(collection, &document, &format!("upsert vertex {}/{}", collection, vertex.key))
    }

    fn upsert_edge(&self, collection: &str, edge: &EdgeRecord) -> Result<()> {
        let document = serde_json::to_value(edge)?;
        self.upsert(collection, &document, &format!("upsert edge {}/{}", collection, edge.key))
    }
}
