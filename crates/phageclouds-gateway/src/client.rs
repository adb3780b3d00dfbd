//! GraphClient trait, the unified interface for remote and embedded stores

use async_trait::async_trait;
use crate::error::GatewayResult;
use crate::models::QueryResult;
use crate::statement::Statement;

/// Read-only client for the phage genome graph.
///
/// Implemented by:
/// - `RemoteClient`: Neo4j HTTP transactional endpoint
/// - `EmbeddedClient`: in-process `PhageGraph` (tests, offline snapshots)
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Execute one read statement and return its rows
    async fn run(&self, statement: &Statement) -> GatewayResult<QueryResult>;

    /// Check that the store answers at all
    async fn verify_connectivity(&self) -> GatewayResult<()>;

    /// Short human-readable description of the backend, for logs
    fn describe(&self) -> String;
}
