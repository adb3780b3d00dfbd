//! One run: extract, annotate, assemble
//!
//! The pipeline borrows the run's single gateway and, for family runs, a
//! taxonomy context. Everything it produces is returned in a `CloudRun`;
//! writing the page is a separate step.

use crate::annotate::{rank_labels, Annotator, ColoringPolicy, Palette, TooltipStyle};
use crate::cloud::{Cloud, CloudExtractor, EntryPredicate};
use crate::config::CanvasConfig;
use crate::graph::{GenomeNode, InvalidThreshold, Threshold};
use crate::model::{GraphModel, GraphModelBuilder};
use crate::render::{HtmlRenderer, RenderConfig, RenderError};
use crate::taxonomy::{AccessionTaxids, TaxonomyError, TaxonomyResolver};
use phageclouds_gateway::{Gateway, GatewayError};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Graph store error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Threshold(#[from] InvalidThreshold),

    #[error("Family runs need a taxonomy database and an accession taxid file")]
    MissingTaxonomy,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Resolver plus the accession → taxid side file
pub struct TaxonomyContext {
    pub resolver: TaxonomyResolver,
    pub taxids: AccessionTaxids,
}

impl TaxonomyContext {
    pub fn new(resolver: TaxonomyResolver, taxids: AccessionTaxids) -> Self {
        Self { resolver, taxids }
    }
}

/// Parameters of one run
#[derive(Debug, Clone, PartialEq)]
pub struct CloudRequest {
    pub predicate: EntryPredicate,
    pub threshold: Threshold,
}

impl CloudRequest {
    /// Request with the predicate's default threshold unless one is given
    pub fn new(predicate: EntryPredicate, threshold: Option<f64>) -> PipelineResult<Self> {
        let threshold = Threshold::new(threshold.unwrap_or_else(|| predicate.default_threshold()))?;
        Ok(Self {
            predicate,
            threshold,
        })
    }
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub seeds: usize,
    /// Model nodes per source tag
    pub nodes_by_source: BTreeMap<String, usize>,
    pub edges: usize,
}

impl RunSummary {
    pub fn node_count(&self) -> usize {
        self.nodes_by_source.values().sum()
    }
}

/// Result of a run, ready to render
#[derive(Debug, Clone)]
pub struct CloudRun {
    pub model: GraphModel,
    pub render: RenderConfig,
    pub file_name: String,
    pub title: String,
    pub summary: RunSummary,
}

impl CloudRun {
    /// Write the page to `dir/file_name`
    pub fn write_to(&self, dir: impl AsRef<Path>) -> PipelineResult<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        Ok(HtmlRenderer::new().write(&self.model, &self.render, &self.title, path)?)
    }
}

pub struct CloudPipeline<'a> {
    gateway: &'a Gateway,
    taxonomy: Option<&'a TaxonomyContext>,
    canvas: CanvasConfig,
}

impl<'a> CloudPipeline<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self {
            gateway,
            taxonomy: None,
            canvas: CanvasConfig::default(),
        }
    }

    pub fn with_taxonomy(mut self, taxonomy: &'a TaxonomyContext) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    pub async fn run(&self, request: &CloudRequest) -> PipelineResult<CloudRun> {
        let predicate = &request.predicate;
        let threshold = request.threshold;
        info!("Building {:?} cloud at distance {}", predicate.subject(), threshold);

        let policy = self.coloring_policy(predicate)?;
        let extractor = CloudExtractor::new(self.gateway);
        let cloud = extractor.extract(predicate, threshold).await?;

        let (model, summary) = if cloud.is_empty() {
            info!("No genomes match {:?}; writing an empty cloud", predicate.subject());
            (GraphModel::default(), RunSummary::default())
        } else {
            let nodes = extractor.node_metadata(&cloud).await?;
            let tooltip = self.tooltip_style(predicate, &nodes)?;
            let annotator = Annotator::new(policy, tooltip, threshold);
            assemble(&cloud, &nodes, &annotator)
        };

        Ok(CloudRun {
            model,
            render: RenderConfig::for_predicate(predicate, &self.canvas.height, &self.canvas.width),
            file_name: predicate.output_file_name(threshold),
            title: format!("{} clouds (distance <= {})", predicate.subject(), threshold),
            summary,
        })
    }

    fn taxonomy(&self) -> PipelineResult<&'a TaxonomyContext> {
        self.taxonomy.ok_or(PipelineError::MissingTaxonomy)
    }

    fn coloring_policy(&self, predicate: &EntryPredicate) -> PipelineResult<ColoringPolicy> {
        Ok(match predicate {
            EntryPredicate::TaxonSubstring { taxon } => ColoringPolicy::TaxonMembership {
                taxon: taxon.clone(),
            },
            EntryPredicate::Family { family, rank } => {
                let names = self.taxonomy()?.resolver.names_at_rank_below(family, rank)?;
                if names.is_empty() {
                    warn!("No {} found below {}; every NCBI genome will be unmatched", rank, family);
                }
                ColoringPolicy::LineageRank {
                    palette: Palette::categorical(names),
                }
            }
            EntryPredicate::HostGenus { .. } => ColoringPolicy::FixedSourceTable,
        })
    }

    fn tooltip_style(&self, predicate: &EntryPredicate, nodes: &[GenomeNode]) -> PipelineResult<TooltipStyle> {
        Ok(match predicate {
            EntryPredicate::TaxonSubstring { .. } => TooltipStyle::None,
            EntryPredicate::Family { rank, .. } => {
                let taxonomy = self.taxonomy()?;
                TooltipStyle::SourceSizeRank {
                    rank: rank.clone(),
                    labels: rank_labels(nodes, &taxonomy.taxids, &taxonomy.resolver, rank)?,
                }
            }
            EntryPredicate::HostGenus { .. } => TooltipStyle::HostGenus,
        })
    }
}

/// Size and colour pass, tooltip pass, then edges
fn assemble(cloud: &Cloud, nodes: &[GenomeNode], annotator: &Annotator) -> (GraphModel, RunSummary) {
    let mut builder = GraphModelBuilder::new();
    for node in nodes {
        builder.upsert_node(node.accession.clone(), annotator.size_and_color(node));
    }
    for node in nodes {
        builder.upsert_node(node.accession.clone(), annotator.tooltip(node));
    }
    if builder.node_count() < cloud.nodes.len() {
        warn!(
            "{} of {} cloud genome(s) have no metadata and are left out",
            cloud.nodes.len() - builder.node_count(),
            cloud.nodes.len()
        );
    }
    for edge in &cloud.edges {
        builder.add_edge(annotator.edge(edge));
    }
    let model = builder.build();

    let mut summary = RunSummary {
        seeds: cloud.seeds.len(),
        edges: model.edges.len(),
        ..Default::default()
    };
    let mut counted = HashSet::new();
    for node in nodes {
        if counted.insert(&node.accession) {
            *summary
                .nodes_by_source
                .entry(node.source.as_str().to_string())
                .or_default() += 1;
        }
    }
    info!(
        "Model has {} node(s) and {} edge(s)",
        model.nodes.len(),
        model.edges.len()
    );
    (model, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{MemoryTaxonomy, TaxId, TieBreak};
    use phageclouds_gateway::{EmbeddedClient, FailurePolicy, GenomeRecord, PhageGraph};

    async fn gateway(graph: PhageGraph, policy: FailurePolicy) -> Gateway {
        Gateway::connect(Box::new(EmbeddedClient::with_graph(graph)), policy)
            .await
            .unwrap()
    }

    fn scenario() -> PhageGraph {
        let mut graph = PhageGraph::new();
        graph.add_genome(
            GenomeRecord::new("A001", "NCBI")
                .with_size(45_000)
                .with_taxonomy("Caudoviricetes; Straboviridae; Tevenvirinae; Tequatrovirus")
                .with_genus("Tequatrovirus"),
        );
        graph.add_genome(
            GenomeRecord::new("A002", "NCBI")
                .with_size(39_000)
                .with_taxonomy("Caudoviricetes; Straboviridae; Mosigvirus"),
        );
        graph.add_genome(GenomeRecord::new("A003", "Tara").with_size(30_000));
        graph.add_shares_dna("A001", "A002", 0.10);
        graph.add_shares_dna("A001", "A003", 0.30);
        graph.add_infects("A001", "Escherichia");
        graph
    }

    fn taxonomy() -> TaxonomyContext {
        let mut tax = MemoryTaxonomy::new();
        tax.insert(1u64, None, "root", "no rank")
            .insert(10u64, Some(1), "Straboviridae", "family")
            .insert(20u64, Some(10), "Tequatrovirus", "genus")
            .insert(21u64, Some(20), "Escherichia phage T4", "species")
            .insert(30u64, Some(10), "Mosigvirus", "genus")
            .insert(31u64, Some(30), "Escherichia phage RB69", "species");
        let taxids = vec![("A001".to_string(), TaxId(21)), ("A002".to_string(), TaxId(31))]
            .into_iter()
            .collect();
        TaxonomyContext::new(TaxonomyResolver::new(Box::new(tax), TieBreak::Error), taxids)
    }

    #[tokio::test]
    async fn test_taxon_run() {
        let gw = gateway(scenario(), FailurePolicy::Strict).await;
        let request = CloudRequest::new(
            EntryPredicate::TaxonSubstring { taxon: "Tevenvirinae".into() },
            None,
        )
        .unwrap();
        let run = CloudPipeline::new(&gw).run(&request).await.unwrap();

        assert_eq!(run.file_name, "Tevenvirinae_025_clouds.html");
        let colors: Vec<_> = run
            .model
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.color.background.as_str()))
            .collect();
        assert_eq!(colors, vec![("A001", "green"), ("A002", "red")]);
        assert!(run.model.nodes.iter().all(|n| n.title.is_none()));
        assert_eq!(run.model.edges.len(), 1);
        assert_eq!(run.summary.nodes_by_source["NCBI"], 2);
        assert_eq!(run.summary.seeds, 1);
    }

    #[tokio::test]
    async fn test_family_run_colours_by_rank() {
        let gw = gateway(scenario(), FailurePolicy::Strict).await;
        let tax = taxonomy();
        let request = CloudRequest::new(
            EntryPredicate::Family { family: "Straboviridae".into(), rank: "genus".into() },
            None,
        )
        .unwrap();
        let run = CloudPipeline::new(&gw).with_taxonomy(&tax).run(&request).await.unwrap();

        assert_eq!(request.threshold.value(), 0.15);
        assert_eq!(run.file_name, "Straboviridae_015_genus_clouds.html");
        let palette = Palette::categorical(["Mosigvirus", "Tequatrovirus"]);
        let a001 = &run.model.nodes[0];
        assert_eq!(&a001.color.background, palette.get("Tequatrovirus").unwrap());
        assert_eq!(
            a001.title.as_deref(),
            Some("Source: NCBI<br>Genome size: 45_000<br>genus: Tequatrovirus")
        );
    }

    #[tokio::test]
    async fn test_family_run_without_taxonomy() {
        let gw = gateway(scenario(), FailurePolicy::Strict).await;
        let request = CloudRequest::new(
            EntryPredicate::Family { family: "Straboviridae".into(), rank: "genus".into() },
            None,
        )
        .unwrap();
        let err = CloudPipeline::new(&gw).run(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingTaxonomy));
    }

    #[tokio::test]
    async fn test_unknown_family_is_an_error() {
        let gw = gateway(scenario(), FailurePolicy::Strict).await;
        let tax = taxonomy();
        let request = CloudRequest::new(
            EntryPredicate::Family { family: "Nowhereviridae".into(), rank: "genus".into() },
            None,
        )
        .unwrap();
        let err = CloudPipeline::new(&gw).with_taxonomy(&tax).run(&request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Taxonomy(TaxonomyError::UnknownTaxon(_))));
    }

    #[tokio::test]
    async fn test_host_run() {
        let gw = gateway(scenario(), FailurePolicy::Strict).await;
        let request = CloudRequest::new(
            EntryPredicate::HostGenus { genus: "Escherichia".into(), harsh: false },
            Some(0.4),
        )
        .unwrap();
        let run = CloudPipeline::new(&gw).run(&request).await.unwrap();

        assert_eq!(run.file_name, "Escherichia_04_clouds_v2.html");
        assert_eq!(run.model.nodes.len(), 3);
        let tara = run.model.nodes.iter().find(|n| n.id.as_str() == "A003").unwrap();
        assert_eq!(tara.color.background.as_str(), "#39dede");
        assert_eq!(tara.size, 10);
        assert_eq!(run.summary.node_count(), 3);
        assert_eq!(run.summary.edges, 2);
    }

    #[tokio::test]
    async fn test_empty_cloud_short_circuits() {
        let gw = gateway(scenario(), FailurePolicy::Strict).await;
        let request = CloudRequest::new(
            EntryPredicate::HostGenus { genus: "Vibrio".into(), harsh: true },
            None,
        )
        .unwrap();
        let run = CloudPipeline::new(&gw).run(&request).await.unwrap();
        assert!(run.model.is_empty());
        assert_eq!(run.summary, RunSummary::default());
    }

    #[test]
    fn test_invalid_threshold() {
        let err = CloudRequest::new(EntryPredicate::TaxonSubstring { taxon: "x".into() }, Some(f64::NAN))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Threshold(_)));
    }
}
