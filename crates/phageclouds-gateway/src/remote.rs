//! RemoteClient: network client for a running Neo4j server
//!
//! Talks to the HTTP transactional endpoint (`/db/{database}/tx/commit`).
//! Each request is its own auto-commit transaction, so nothing is held open
//! between statements.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::GraphClient;
use crate::error::{GatewayError, GatewayResult};
use crate::models::QueryResult;
use crate::statement::Statement;

/// Connection settings for a Neo4j server
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// HTTP base URL, e.g. `http://127.0.0.1:7474`
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Database name (`neo4j` on a default install)
    pub database: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            uri: "http://127.0.0.1:7474".to_string(),
            user: "neo4j".to_string(),
            password: "phagedb".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Network client that connects to a running Neo4j server.
pub struct RemoteClient {
    config: RemoteConfig,
    http_client: Client,
}

impl RemoteClient {
    /// Create a new RemoteClient.
    ///
    /// # Example
    /// ```no_run
    /// # use phageclouds_gateway::{RemoteClient, RemoteConfig};
    /// let client = RemoteClient::new(RemoteConfig::default());
    /// ```
    pub fn new(mut config: RemoteConfig) -> Self {
        config.uri = config.uri.trim_end_matches('/').to_string();
        Self {
            config,
            http_client: Client::new(),
        }
    }

    fn commit_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.config.uri, self.config.database)
    }

    /// POST one statement to the commit endpoint
    async fn post_statement(&self, cypher: &str, parameters: Value) -> GatewayResult<QueryResult> {
        let body = json!({
            "statements": [{ "statement": cypher, "parameters": parameters }]
        });

        let response = self
            .http_client
            .post(self.commit_url())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Connection(format!(
                "authentication rejected ({})",
                status
            )));
        }
        if !status.is_success() {
            return Err(GatewayError::Query(format!("server returned {}", status)));
        }

        let payload: Value = response.json().await?;
        parse_commit_response(payload)
    }
}

#[derive(Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Deserialize)]
struct DataRow {
    row: Vec<Value>,
}

#[derive(Deserialize)]
struct ServerError {
    code: String,
    message: String,
}

/// Turn a transactional-endpoint response body into a `QueryResult`.
///
/// The server answers 200 even for failed statements and reports them in
/// `errors`, so that array has to be checked before the results.
pub fn parse_commit_response(payload: Value) -> GatewayResult<QueryResult> {
    let response: CommitResponse = serde_json::from_value(payload)?;

    if let Some(err) = response.errors.first() {
        return Err(GatewayError::Query(format!("{}: {}", err.code, err.message)));
    }

    let statement = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Query("response carried no result".to_string()))?;

    let mut result = QueryResult {
        columns: statement.columns,
        records: Vec::with_capacity(statement.data.len()),
    };
    for data in statement.data {
        result.push_row(data.row);
    }
    Ok(result)
}

#[async_trait]
impl GraphClient for RemoteClient {
    async fn run(&self, statement: &Statement) -> GatewayResult<QueryResult> {
        let cypher = statement.to_cypher();
        self.post_statement(&cypher.text, Value::Object(cypher.parameters))
            .await
    }

    async fn verify_connectivity(&self) -> GatewayResult<()> {
        self.post_statement("RETURN 1 AS ok", json!({})).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("neo4j {} (database {})", self.config.uri, self.config.database)
    }
}
