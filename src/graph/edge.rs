//! `sharesDNA` edges
//!
//! Stored directed; the direction is kept in the output but the renderer
//! treats edges as plain connections.

use super::types::{Accession, Threshold};
use phageclouds_gateway::Table;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A `sharesDNA` relationship between two genomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharesDnaEdge {
    pub source: Accession,
    pub target: Accession,
    /// Genomic distance, lower is more similar
    pub distance: f64,
}

impl SharesDnaEdge {
    pub fn new(source: impl Into<Accession>, target: impl Into<Accession>, distance: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            distance,
        }
    }

    /// Renderer weight under `threshold`
    pub fn visual_weight(&self, threshold: Threshold) -> f64 {
        threshold.visual_weight(self.distance)
    }

    /// Read edges from an induced edge table (`source`, `target`, `distance`)
    pub fn from_table(table: &Table) -> Vec<SharesDnaEdge> {
        let mut edges = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            match (
                table.str_cell(row, "source"),
                table.str_cell(row, "target"),
                table.f64_cell(row, "distance"),
            ) {
                (Some(source), Some(target), Some(distance)) => {
                    edges.push(SharesDnaEdge::new(source, target, distance));
                }
                _ => warn!("Skipping incomplete edge row {}", row),
            }
        }
        edges
    }
}
