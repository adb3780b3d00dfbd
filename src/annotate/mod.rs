//! Attribute annotation
//!
//! Turns genome metadata and edges into renderer attributes: node colour
//! and size, node tooltips, edge weight and colour.

pub mod palette;
pub mod policy;

use crate::graph::{Accession, Color, GenomeNode, SharesDnaEdge, Threshold};
use crate::model::{NodeAttributes, NodeColor, VisEdge, EDGE_COLOR};
use crate::taxonomy::{AccessionTaxids, TaxonomyError, TaxonomyResolver, TaxonomyResult};
use std::collections::HashMap;
use tracing::{debug, warn};

pub use palette::{Palette, TAB20};
pub use policy::ColoringPolicy;

/// Shown for tooltip fields with no value
const ABSENT: &str = "None";

/// Tooltip layout for a run
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipStyle {
    /// No tooltip
    None,
    /// Source, genome size and the genome's taxon at `rank`
    SourceSizeRank {
        rank: String,
        labels: HashMap<Accession, String>,
    },
    /// Host genus, phage genus and genome size
    HostGenus,
}

/// `45000` → `45_000`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }
    out
}

impl TooltipStyle {
    pub fn render(&self, node: &GenomeNode) -> Option<String> {
        match self {
            TooltipStyle::None => None,
            TooltipStyle::SourceSizeRank { rank, labels } => Some(format!(
                "Source: {}<br>Genome size: {}<br>{}: {}",
                node.source,
                group_thousands(node.genome_size),
                rank,
                labels.get(&node.accession).map(String::as_str).unwrap_or(ABSENT)
            )),
            TooltipStyle::HostGenus => Some(format!(
                "Target host genus: {}<br>Phage genus: {}<br>Genome size: {} bp",
                node.host_genus.as_deref().unwrap_or(ABSENT),
                node.genus.as_deref().unwrap_or(ABSENT),
                group_thousands(node.genome_size)
            )),
        }
    }
}

/// Name at `rank` for every genome that has a taxid in `taxids`.
///
/// Genomes without a mapped taxid, or whose taxid the taxonomy does not
/// know, get no label.
pub fn rank_labels(
    nodes: &[GenomeNode],
    taxids: &AccessionTaxids,
    resolver: &TaxonomyResolver,
    rank: &str,
) -> TaxonomyResult<HashMap<Accession, String>> {
    let mut labels = HashMap::new();
    for node in nodes {
        if labels.contains_key(&node.accession) {
            continue;
        }
        let Some(taxid) = taxids.get(node.accession.as_str()) else {
            continue;
        };
        match resolver.classify_taxid_at_rank(taxid, rank) {
            Ok(Some(name)) => {
                labels.insert(node.accession.clone(), name);
            }
            Ok(None) => {}
            Err(TaxonomyError::UnknownTaxId(id)) => {
                warn!("Genome {} maps to unknown taxid {}", node.accession, id);
            }
            Err(e) => return Err(e),
        }
    }
    debug!("Classified {} of {} genome(s) at rank {}", labels.len(), nodes.len(), rank);
    Ok(labels)
}

/// Applies one colouring policy and tooltip style under one threshold
#[derive(Debug, Clone)]
pub struct Annotator {
    policy: ColoringPolicy,
    tooltip: TooltipStyle,
    threshold: Threshold,
}

impl Annotator {
    pub fn new(policy: ColoringPolicy, tooltip: TooltipStyle, threshold: Threshold) -> Self {
        Self {
            policy,
            tooltip,
            threshold,
        }
    }

    /// First pass: size and colour
    pub fn size_and_color(&self, node: &GenomeNode) -> NodeAttributes {
        NodeAttributes {
            size: Some(node.derived_size()),
            color: Some(NodeColor::filled(self.policy.classify(node))),
            title: None,
        }
    }

    /// Second pass: tooltip only
    pub fn tooltip(&self, node: &GenomeNode) -> NodeAttributes {
        NodeAttributes {
            title: self.tooltip.render(node),
            ..Default::default()
        }
    }

    pub fn edge(&self, edge: &SharesDnaEdge) -> VisEdge {
        VisEdge {
            from: edge.source.clone(),
            to: edge.target.clone(),
            weight: edge.distance,
            value: edge.visual_weight(self.threshold),
            color: Color::from(EDGE_COLOR),
            title: Some(edge.distance.to_string()),
        }
    }
}
