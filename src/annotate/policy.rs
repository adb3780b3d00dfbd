//! Node colouring policies
//!
//! One policy is picked per run from the entry predicate and applied to
//! every genome. Each is a pure function of the genome's source, lineage
//! and the policy's own context.

use super::palette::Palette;
use crate::graph::{Color, GenomeNode, GenomeSource};

/// Colour for genomes no rule covers
pub const FALLBACK_COLOR: &str = "yellow";
/// NCBI genome whose lineage hits no palette key
pub const UNMATCHED_LINEAGE_COLOR: &str = "#000000";
/// Non-NCBI genome under lineage-rank colouring
pub const NON_NCBI_LINEAGE_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, PartialEq)]
pub enum ColoringPolicy {
    /// NCBI genomes green when their lineage contains `taxon`, red otherwise;
    /// other sources get a colour of their own
    TaxonMembership { taxon: String },
    /// NCBI genomes take the palette colour of the first key found in their
    /// lineage
    LineageRank { palette: Palette },
    /// Colour by source only
    FixedSourceTable,
}

impl ColoringPolicy {
    pub fn classify(&self, node: &GenomeNode) -> Color {
        match self {
            ColoringPolicy::TaxonMembership { taxon } => taxon_membership_color(node, taxon),
            ColoringPolicy::LineageRank { palette } => lineage_rank_color(node, palette),
            ColoringPolicy::FixedSourceTable => source_table_color(&node.source),
        }
    }
}

fn taxon_membership_color(node: &GenomeNode, taxon: &str) -> Color {
    let color = match &node.source {
        GenomeSource::Ncbi if node.lineage_contains(taxon) => "green",
        GenomeSource::Ncbi => "red",
        GenomeSource::Tara => "cyan",
        GenomeSource::GpdIsolate => "pink",
        GenomeSource::GpdMetagenome => "purple",
        _ => FALLBACK_COLOR,
    };
    Color::from(color)
}

fn lineage_rank_color(node: &GenomeNode, palette: &Palette) -> Color {
    if !node.source.is_ncbi() {
        return Color::from(NON_NCBI_LINEAGE_COLOR);
    }
    node.lineage
        .as_deref()
        .and_then(|lineage| palette.first_contained_in(lineage))
        .cloned()
        .unwrap_or_else(|| Color::from(UNMATCHED_LINEAGE_COLOR))
}

fn source_table_color(source: &GenomeSource) -> Color {
    let color = match source {
        GenomeSource::Ncbi => "#8acb4a",
        GenomeSource::Tara => "#39dede",
        GenomeSource::GtdbPredictedProphages => "#f1e653",
        GenomeSource::GpdIsolate => "#9b4aed",
        GenomeSource::GpdMetagenome => "#c734df",
        GenomeSource::Other(_) => FALLBACK_COLOR,
    };
    Color::from(color)
}
