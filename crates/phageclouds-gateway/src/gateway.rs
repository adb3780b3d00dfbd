//! Gateway: one store connection per run, with an explicit failure policy
//!
//! A run builds exactly one `Gateway` and hands a reference to every stage.
//! Under the lenient policy a failed connection leaves the gateway
//! unavailable and every later query comes back empty; a failed query comes
//! back empty on its own. The strict policy turns both into errors.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use crate::client::GraphClient;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{QueryResult, Table};
use crate::statement::Statement;

/// What to do when the store or a query fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log and continue with empty results
    #[default]
    Lenient,
    /// Abort the run
    Strict,
}

/// Outcome of a single query
#[derive(Debug)]
pub enum QueryOutcome {
    /// Statement ran; the result may still have zero rows
    Rows(QueryResult),
    /// Statement was sent and failed
    Failed(GatewayError),
    /// Gateway lost its connection earlier in the run
    Unavailable,
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Rows(_))
    }
}

/// Read gateway over a graph client
pub struct Gateway {
    client: Box<dyn GraphClient>,
    policy: FailurePolicy,
    available: AtomicBool,
    unavailable_reason: std::sync::Mutex<Option<String>>,
}

impl Gateway {
    /// Wrap a client and check connectivity once.
    ///
    /// With `FailurePolicy::Strict` a failed check is returned as an error;
    /// otherwise the gateway is created in the unavailable state.
    pub async fn connect(
        client: Box<dyn GraphClient>,
        policy: FailurePolicy,
    ) -> GatewayResult<Self> {
        let description = client.describe();
        let gateway = Self {
            client,
            policy,
            available: AtomicBool::new(true),
            unavailable_reason: std::sync::Mutex::new(None),
        };

        match gateway.client.verify_connectivity().await {
            Ok(()) => info!("Connected to {}", description),
            Err(e) => {
                error!("Failed to connect to {}: {}", description, e);
                if policy == FailurePolicy::Strict {
                    return Err(e);
                }
                gateway.mark_unavailable(e.to_string());
            }
        }

        Ok(gateway)
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn mark_unavailable(&self, reason: String) {
        self.available.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.unavailable_reason.lock() {
            *slot = Some(reason);
        }
    }

    fn unavailable_reason(&self) -> String {
        self.unavailable_reason
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .unwrap_or_else(|| "connection failed".to_string())
    }

    /// Run one statement and report how it went
    pub async fn run_query(&self, statement: &Statement) -> QueryOutcome {
        if !self.is_available() {
            debug!("Skipping {}: gateway unavailable", statement.name());
            return QueryOutcome::Unavailable;
        }

        debug!("CYPHER - running query: {}", statement.to_cypher());

        match self.client.run(statement).await {
            Ok(result) => {
                debug!("{} returned {} row(s)", statement.name(), result.len());
                QueryOutcome::Rows(result)
            }
            Err(GatewayError::Connection(msg)) => {
                error!("Lost connection during {}: {}", statement.name(), msg);
                self.mark_unavailable(msg.clone());
                QueryOutcome::Failed(GatewayError::Connection(msg))
            }
            Err(e) => {
                warn!("Query failed ({}): {}", statement.name(), e);
                QueryOutcome::Failed(e)
            }
        }
    }

    /// Run one statement and return its rows as a column-major table.
    ///
    /// Lenient: failures yield an empty table. Strict: failures are errors.
    pub async fn query_to_table(&self, statement: &Statement) -> GatewayResult<Table> {
        match self.run_query(statement).await {
            QueryOutcome::Rows(result) => Ok(result.into_table()),
            QueryOutcome::Failed(e) => match self.policy {
                FailurePolicy::Lenient => {
                    warn!("Continuing with empty {} result", statement.name());
                    Ok(Table::empty())
                }
                FailurePolicy::Strict => Err(e),
            },
            QueryOutcome::Unavailable => match self.policy {
                FailurePolicy::Lenient => Ok(Table::empty()),
                FailurePolicy::Strict => Err(GatewayError::Unavailable(self.unavailable_reason())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedded::{EmbeddedClient, GenomeRecord, PhageGraph};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    /// Client whose connectivity check and queries can be made to fail
    struct FlakyClient {
        connect_ok: bool,
        query_error: Option<fn() -> GatewayError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GraphClient for FlakyClient {
        async fn run(&self, _statement: &Statement) -> GatewayResult<QueryResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.query_error {
                Some(make) => Err(make()),
                None => Ok(QueryResult::with_columns(&["seed", "neighbor"])),
            }
        }

        async fn verify_connectivity(&self) -> GatewayResult<()> {
            if self.connect_ok {
                Ok(())
            } else {
                Err(GatewayError::Connection("refused".to_string()))
            }
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    fn statement() -> Statement {
        Statement::NodeMetadata {
            accessions: vec!["A001".to_string()],
        }
    }

    #[tokio::test]
    async fn test_lenient_connection_failure_degrades_to_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = FlakyClient {
            connect_ok: false,
            query_error: None,
            calls: Arc::clone(&calls),
        };
        let gateway = Gateway::connect(Box::new(client), FailurePolicy::Lenient)
            .await
            .unwrap();
        assert!(!gateway.is_available());

        assert!(matches!(gateway.run_query(&statement()).await, QueryOutcome::Unavailable));
        let table = gateway.query_to_table(&statement()).await.unwrap();
        assert!(table.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_strict_connection_failure_is_an_error() {
        let client = FlakyClient {
            connect_ok: false,
            query_error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let result = Gateway::connect(Box::new(client), FailurePolicy::Strict).await;
        assert!(matches!(result, Err(GatewayError::Connection(_))));
    }

    #[tokio::test]
    async fn test_query_failure_is_distinguishable_from_no_rows() {
        let client = FlakyClient {
            connect_ok: true,
            query_error: Some(|| GatewayError::Query("syntax".to_string())),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let gateway = Gateway::connect(Box::new(client), FailurePolicy::Lenient)
            .await
            .unwrap();

        let outcome = gateway.run_query(&statement()).await;
        assert!(matches!(outcome, QueryOutcome::Failed(GatewayError::Query(_))));
        assert!(gateway.is_available());
        assert!(gateway.query_to_table(&statement()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strict_query_failure_propagates() {
        let client = FlakyClient {
            connect_ok: true,
            query_error: Some(|| GatewayError::Query("syntax".to_string())),
            calls: Arc::new(AtomicUsize::new(0)),
        };
        let gateway = Gateway::connect(Box::new(client), FailurePolicy::Strict)
            .await
            .unwrap();
        assert!(gateway.query_to_table(&statement()).await.is_err());
    }

    #[tokio::test]
    async fn test_connection_lost_mid_run_disables_gateway() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = FlakyClient {
            connect_ok: true,
            query_error: Some(|| GatewayError::Connection("reset".to_string())),
            calls: Arc::clone(&calls),
        };
        let gateway = Gateway::connect(Box::new(client), FailurePolicy::Lenient)
            .await
            .unwrap();

        assert!(!gateway.run_query(&statement()).await.is_success());
        assert!(!gateway.is_available());
        assert!(matches!(gateway.run_query(&statement()).await, QueryOutcome::Unavailable));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embedded_rows_reach_table() {
        let mut graph = PhageGraph::new();
        graph.add_genome(GenomeRecord::new("A001", "NCBI").with_size(40_000));
        let gateway = Gateway::connect(
            Box::new(EmbeddedClient::with_graph(graph)),
            FailurePolicy::Strict,
        )
        .await
        .unwrap();

        let table = gateway.query_to_table(&statement()).await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.u64_cell(0, "genome_size"), Some(40_000));
    }
}
