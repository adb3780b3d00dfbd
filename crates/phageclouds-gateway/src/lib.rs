//! Phage Clouds gateway: read access to the phage genome graph
//!
//! Provides two client implementations:
//!
//! - **`RemoteClient`**: Neo4j over the HTTP transactional endpoint.
//!
//! - **`EmbeddedClient`**: in-process `PhageGraph`, no network. Used by
//!   tests and for running against a JSON snapshot.
//!
//! Both implement the `GraphClient` trait. Pipeline stages go through a
//! `Gateway`, which owns the client for the run and applies the
//! `FailurePolicy`.
//!
//! # Quick Start
//!
//! ```rust
//! use phageclouds_gateway::{
//!     EmbeddedClient, FailurePolicy, Gateway, GenomeRecord, PhageGraph, Statement,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut graph = PhageGraph::new();
//!     graph.add_genome(GenomeRecord::new("A001", "NCBI").with_size(45_000));
//!
//!     let gateway = Gateway::connect(
//!         Box::new(EmbeddedClient::with_graph(graph)),
//!         FailurePolicy::Lenient,
//!     )
//!     .await
//!     .unwrap();
//!
//!     let table = gateway
//!         .query_to_table(&Statement::NodeMetadata { accessions: vec!["A001".into()] })
//!         .await
//!         .unwrap();
//!     println!("Found {} records", table.len());
//! }
//! ```

pub mod client;
pub mod embedded;
pub mod error;
pub mod gateway;
pub mod models;
pub mod remote;
pub mod statement;

pub use client::GraphClient;
pub use embedded::{EmbeddedClient, GenomeRecord, InfectsRecord, PhageGraph, SharesDnaRecord};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{FailurePolicy, Gateway, QueryOutcome};
pub use models::{QueryResult, Table};
pub use remote::{RemoteClient, RemoteConfig};
pub use statement::{CypherQuery, SeedFilter, Statement, NCBI_SOURCE};
