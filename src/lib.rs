//! Phage Clouds
//!
//! Extracts "clouds" of genomically similar phage genomes from a graph
//! database, annotates them by taxonomy, host or source, and writes an
//! interactive vis-network page.
//!
//! # Stages
//!
//! - `cloud`: seed genomes for an entry predicate, one-hop `sharesDNA`
//!   neighbours within the distance threshold, and the induced edge set
//! - `taxonomy`: NCBI taxonomy lookups for rank-based colouring
//! - `annotate`: node colour, size and tooltip; edge weight
//! - `model`: merges annotation passes into one node/edge list
//! - `render`: fills the page template
//! - `pipeline`: runs the stages for one request
//!
//! All store access goes through one `phageclouds_gateway::Gateway` per run.
//!
//! ## Example Usage
//!
//! ```rust
//! use phageclouds::{CloudPipeline, CloudRequest, EntryPredicate};
//! use phageclouds_gateway::{EmbeddedClient, FailurePolicy, Gateway, GenomeRecord, PhageGraph};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = PhageGraph::new();
//! graph.add_genome(GenomeRecord::new("A001", "NCBI").with_size(45_000).with_taxonomy("Straboviridae; Tevenvirinae"));
//! graph.add_genome(GenomeRecord::new("A002", "Tara").with_size(39_000));
//! graph.add_shares_dna("A001", "A002", 0.1);
//!
//! let gateway = Gateway::connect(Box::new(EmbeddedClient::with_graph(graph)), FailurePolicy::Strict).await?;
//! let request = CloudRequest::new(EntryPredicate::TaxonSubstring { taxon: "Tevenvirinae".into() }, None)?;
//! let run = CloudPipeline::new(&gateway).run(&request).await?;
//!
//! assert_eq!(run.model.nodes.len(), 2);
//! assert_eq!(run.file_name, "Tevenvirinae_025_clouds.html");
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod annotate;
pub mod cloud;
pub mod config;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod taxonomy;

// Re-export main types for convenience
pub use graph::{Accession, Color, GenomeNode, GenomeSource, SharesDnaEdge, Threshold};

pub use cloud::{Cloud, CloudExtractor, EntryPredicate, DEFAULT_FAMILY_THRESHOLD, DEFAULT_THRESHOLD};

pub use annotate::{Annotator, ColoringPolicy, Palette, TooltipStyle};

pub use model::{GraphModel, GraphModelBuilder, VisEdge, VisNode};

pub use render::{HtmlRenderer, Physics, RenderConfig, RenderError, RenderResult};

pub use taxonomy::{
    AccessionTaxids, MemoryTaxonomy, SqliteTaxonomy, TaxId, TaxonomyError, TaxonomyLookup,
    TaxonomyResolver, TaxonomyResult, TieBreak,
};

pub use config::{ConfigError, ConfigResult, PhageCloudsConfig};

pub use pipeline::{
    CloudPipeline, CloudRequest, CloudRun, PipelineError, PipelineResult, RunSummary,
    TaxonomyContext,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
