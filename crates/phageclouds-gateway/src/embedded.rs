//! EmbeddedClient: in-process phage graph
//!
//! Holds genomes, hosts and their relationships in memory and evaluates
//! `Statement`s directly, no network needed. Used by tests and for running
//! against a JSON snapshot of the store.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::GraphClient;
use crate::error::GatewayResult;
use crate::models::QueryResult;
use crate::statement::{SeedFilter, Statement, NCBI_SOURCE};

/// A `PhageGenome` node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub accession: String,
    pub source: String,
    #[serde(default)]
    pub genome_size: Option<u64>,
    #[serde(default)]
    pub taxonomy: Option<String>,
    #[serde(default)]
    pub genus: Option<String>,
}

impl GenomeRecord {
    pub fn new(accession: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            source: source.into(),
            genome_size: None,
            taxonomy: None,
            genus: None,
        }
    }

    pub fn with_size(mut self, genome_size: u64) -> Self {
        self.genome_size = Some(genome_size);
        self
    }

    pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
        self.taxonomy = Some(taxonomy.into());
        self
    }

    pub fn with_genus(mut self, genus: impl Into<String>) -> Self {
        self.genus = Some(genus.into());
        self
    }
}

/// A directed `sharesDNA` relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharesDnaRecord {
    pub source: String,
    pub target: String,
    pub distance: f64,
}

/// An `infects` relationship, the host identified by its genus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfectsRecord {
    pub genome: String,
    pub host_genus: String,
}

/// On-disk snapshot layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    genomes: Vec<GenomeRecord>,
    #[serde(default)]
    shares_dna: Vec<SharesDnaRecord>,
    #[serde(default)]
    infects: Vec<InfectsRecord>,
}

/// In-memory phage genome graph
#[derive(Debug, Default, Clone)]
pub struct PhageGraph {
    genomes: IndexMap<String, GenomeRecord>,
    shares_dna: Vec<SharesDnaRecord>,
    /// Outgoing `sharesDNA` edges per accession (indices into `shares_dna`)
    outgoing: HashMap<String, Vec<usize>>,
    hosts: HashMap<String, Vec<String>>,
}

impl PhageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot (`genomes`, `shares_dna`, `infects` arrays)
    pub fn from_json_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> GatewayResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        let mut graph = Self::new();
        for genome in snapshot.genomes {
            graph.add_genome(genome);
        }
        for edge in snapshot.shares_dna {
            graph.add_shares_dna(edge.source, edge.target, edge.distance);
        }
        for infects in snapshot.infects {
            graph.add_infects(infects.genome, infects.host_genus);
        }
        Ok(graph)
    }

    /// Insert or replace a genome
    pub fn add_genome(&mut self, genome: GenomeRecord) {
        self.genomes.insert(genome.accession.clone(), genome);
    }

    pub fn add_shares_dna(&mut self, source: impl Into<String>, target: impl Into<String>, distance: f64) {
        let source = source.into();
        self.outgoing
            .entry(source.clone())
            .or_default()
            .push(self.shares_dna.len());
        self.shares_dna.push(SharesDnaRecord {
            source,
            target: target.into(),
            distance,
        });
    }

    pub fn add_infects(&mut self, genome: impl Into<String>, host_genus: impl Into<String>) {
        self.hosts
            .entry(genome.into())
            .or_default()
            .push(host_genus.into());
    }

    pub fn genome_count(&self) -> usize {
        self.genomes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.shares_dna.len()
    }

    fn matches_seed(&self, genome: &GenomeRecord, seed: &SeedFilter) -> bool {
        match seed {
            SeedFilter::LineageContains { text } => {
                genome.source == NCBI_SOURCE
                    && genome
                        .taxonomy
                        .as_deref()
                        .is_some_and(|lineage| lineage.contains(text.as_str()))
            }
            SeedFilter::InfectsHostGenus {
                genus,
                excluded_source,
            } => {
                let infects = self
                    .hosts
                    .get(&genome.accession)
                    .is_some_and(|hosts| hosts.iter().any(|h| h == genus));
                let excluded = excluded_source
                    .as_deref()
                    .is_some_and(|source| genome.source == source);
                infects && !excluded
            }
        }
    }

    /// Outgoing edges from `accession` to known genomes
    fn edges_from<'a>(&'a self, accession: &str) -> impl Iterator<Item = &'a SharesDnaRecord> + 'a {
        self.outgoing
            .get(accession)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.shares_dna[idx])
            .filter(move |edge| self.genomes.contains_key(&edge.target))
    }

    /// Evaluate a statement with the same semantics as its Cypher rendering
    pub fn evaluate(&self, statement: &Statement) -> QueryResult {
        let mut result = QueryResult::with_columns(statement.columns());

        match statement {
            Statement::SeedNeighborhood { seed, threshold } => {
                for genome in self.genomes.values().filter(|g| self.matches_seed(g, seed)) {
                    let mut matched = false;
                    for edge in self.edges_from(&genome.accession) {
                        if edge.distance <= *threshold {
                            matched = true;
                            result.push_row(vec![json!(genome.accession), json!(edge.target)]);
                        }
                    }
                    if !matched {
                        result.push_row(vec![json!(genome.accession), Value::Null]);
                    }
                }
            }
            Statement::NodeMetadata { accessions } => {
                let wanted: HashSet<&str> = accessions.iter().map(String::as_str).collect();
                for genome in self.genomes.values() {
                    if !wanted.contains(genome.accession.as_str()) {
                        continue;
                    }
                    let base = vec![
                        json!(genome.accession),
                        json!(genome.source),
                        json!(genome.genome_size),
                        json!(genome.taxonomy),
                        json!(genome.genus),
                    ];
                    match self.hosts.get(&genome.accession) {
                        Some(hosts) if !hosts.is_empty() => {
                            for host in hosts {
                                let mut row = base.clone();
                                row.push(json!(host));
                                result.push_row(row);
                            }
                        }
                        _ => result.push_row(base),
                    }
                }
            }
            Statement::InducedEdges {
                accessions,
                threshold,
            } => {
                let wanted: HashSet<&str> = accessions.iter().map(String::as_str).collect();
                for edge in &self.shares_dna {
                    if wanted.contains(edge.source.as_str())
                        && wanted.contains(edge.target.as_str())
                        && self.genomes.contains_key(&edge.source)
                        && self.genomes.contains_key(&edge.target)
                        && edge.distance <= *threshold
                    {
                        result.push_row(vec![
                            json!(edge.source),
                            json!(edge.target),
                            json!(edge.distance),
                        ]);
                    }
                }
            }
        }

        result
    }
}

/// In-process client that wraps a `PhageGraph` directly.
pub struct EmbeddedClient {
    graph: Arc<RwLock<PhageGraph>>,
}

impl EmbeddedClient {
    /// Create an EmbeddedClient over an empty graph
    pub fn new() -> Self {
        Self::with_graph(PhageGraph::new())
    }

    pub fn with_graph(graph: PhageGraph) -> Self {
        Self {
            graph: Arc::new(RwLock::new(graph)),
        }
    }

    /// Load a JSON snapshot into a new client
    pub fn from_json_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        Ok(Self::with_graph(PhageGraph::from_json_file(path)?))
    }
}

impl Default for EmbeddedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphClient for EmbeddedClient {
    async fn run(&self, statement: &Statement) -> GatewayResult<QueryResult> {
        let graph = self.graph.read().await;
        Ok(graph.evaluate(statement))
    }

    async fn verify_connectivity(&self) -> GatewayResult<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "embedded phage graph".to_string()
    }
}
