//! Genome nodes
//!
//! A `GenomeNode` is one row of the node metadata query, typed. Derived
//! visual attributes are not stored here; the annotator computes them.

use super::types::Accession;
use phageclouds_gateway::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Base pairs per unit of rendered node size
pub const SIZE_SCALE_FACTOR: u64 = 3000;

/// Database a genome was collected from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenomeSource {
    Ncbi,
    Tara,
    GtdbPredictedProphages,
    GpdIsolate,
    GpdMetagenome,
    Other(String),
}

impl GenomeSource {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "NCBI" => GenomeSource::Ncbi,
            "Tara" => GenomeSource::Tara,
            "GTDB_predicted_prophages" => GenomeSource::GtdbPredictedProphages,
            "GPD_Isolate" => GenomeSource::GpdIsolate,
            "GPD_Metagenome" => GenomeSource::GpdMetagenome,
            other => GenomeSource::Other(other.to_string()),
        }
    }

    /// Tag as stored in the graph
    pub fn as_str(&self) -> &str {
        match self {
            GenomeSource::Ncbi => "NCBI",
            GenomeSource::Tara => "Tara",
            GenomeSource::GtdbPredictedProphages => "GTDB_predicted_prophages",
            GenomeSource::GpdIsolate => "GPD_Isolate",
            GenomeSource::GpdMetagenome => "GPD_Metagenome",
            GenomeSource::Other(tag) => tag,
        }
    }

    pub fn is_ncbi(&self) -> bool {
        matches!(self, GenomeSource::Ncbi)
    }
}

impl fmt::Display for GenomeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A `PhageGenome` with the metadata the annotator needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeNode {
    pub accession: Accession,
    pub source: GenomeSource,
    /// Genome length in base pairs
    pub genome_size: u64,
    /// Free-text lineage (`taxonomy` property)
    pub lineage: Option<String>,
    /// Phage genus (`genus` property)
    pub genus: Option<String>,
    /// Bacterial host genus, when an `infects` relationship exists
    pub host_genus: Option<String>,
}

impl GenomeNode {
    pub fn new(accession: impl Into<Accession>, source: GenomeSource, genome_size: u64) -> Self {
        Self {
            accession: accession.into(),
            source,
            genome_size,
            lineage: None,
            genus: None,
            host_genus: None,
        }
    }

    pub fn with_lineage(mut self, lineage: impl Into<String>) -> Self {
        self.lineage = Some(lineage.into());
        self
    }

    pub fn with_genus(mut self, genus: impl Into<String>) -> Self {
        self.genus = Some(genus.into());
        self
    }

    pub fn with_host_genus(mut self, host: impl Into<String>) -> Self {
        self.host_genus = Some(host.into());
        self
    }

    /// Rendered node size: `genome_size / 3000`, truncated
    pub fn derived_size(&self) -> u64 {
        self.genome_size / SIZE_SCALE_FACTOR
    }

    /// Whether the lineage text contains `taxon`
    pub fn lineage_contains(&self, taxon: &str) -> bool {
        self.lineage
            .as_deref()
            .is_some_and(|lineage| lineage.contains(taxon))
    }

    /// Read genome rows from a node metadata table.
    ///
    /// Rows without an accession are skipped. A genome with several hosts
    /// appears once per host, in table order.
    pub fn from_table(table: &Table) -> Vec<GenomeNode> {
        let mut nodes = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let Some(accession) = table.str_cell(row, "accession") else {
                warn!("Skipping metadata row {} without accession", row);
                continue;
            };
            let genome_size = table.u64_cell(row, "genome_size").unwrap_or_else(|| {
                warn!("Genome {} has no genome_size, using 0", accession);
                0
            });
            let source = GenomeSource::parse(table.str_cell(row, "source").unwrap_or(""));

            nodes.push(GenomeNode {
                accession: Accession::new(accession),
                source,
                genome_size,
                lineage: table.str_cell(row, "taxonomy").map(str::to_string),
                genus: table.str_cell(row, "genus").map(str::to_string),
                host_genus: table.str_cell(row, "host_genus").map(str::to_string),
            });
        }
        nodes
    }
}
