//! Phage genome graph model
//!
//! - `GenomeNode`: a `PhageGenome` with source, size, lineage and host
//! - `SharesDnaEdge`: a directed `sharesDNA` relationship with its distance
//! - `Threshold`: the distance cut-off shared by every stage of a run

pub mod edge;
pub mod node;
pub mod types;

pub use edge::SharesDnaEdge;
pub use node::{GenomeNode, GenomeSource, SIZE_SCALE_FACTOR};
pub use types::{Accession, Color, InvalidThreshold, Threshold};
