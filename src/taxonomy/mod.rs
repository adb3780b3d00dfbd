//! Taxonomy resolution
//!
//! Maps taxon names to NCBI taxonomy identifiers, walks lineages and
//! descendant sets, and classifies a genome at a given rank. The lookup
//! itself sits behind `TaxonomyLookup`; `SqliteTaxonomy` reads a local NCBI
//! taxonomy dump and `MemoryTaxonomy` serves tests.

pub mod accessions;
pub mod memory;
pub mod resolver;
pub mod sqlite;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use accessions::AccessionTaxids;
pub use memory::MemoryTaxonomy;
pub use resolver::{TaxonomyResolver, TieBreak};
pub use sqlite::SqliteTaxonomy;

/// NCBI taxonomy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TaxId(pub u64);

impl TaxId {
    pub fn new(id: u64) -> Self {
        TaxId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaxId {
    fn from(id: u64) -> Self {
        TaxId(id)
    }
}

/// Errors from taxonomy lookups and the accession mapping file
#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Unknown taxon name: {0}")]
    UnknownTaxon(String),

    #[error("Taxon name {name} is ambiguous: {candidates:?}")]
    AmbiguousTaxon { name: String, candidates: Vec<TaxId> },

    #[error("Unknown taxonomy identifier: {0}")]
    UnknownTaxId(TaxId),

    #[error("Taxonomy database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot read accession mapping {path}: {source}")]
    MappingFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed accession mapping at line {line}: {content:?}")]
    MalformedMapping { line: usize, content: String },
}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Raw taxonomy lookups
pub trait TaxonomyLookup: Send + Sync {
    /// Every identifier whose scientific name (or synonym) equals `name`
    fn ids_for_name(&self, name: &str) -> TaxonomyResult<Vec<TaxId>>;

    /// All taxa below `id`, at any depth
    fn descendants(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>>;

    /// Identifiers from the root down to `id` (inclusive)
    fn lineage(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>>;

    /// Rank label, e.g. `genus`, `subfamily`, `no rank`
    fn rank(&self, id: TaxId) -> TaxonomyResult<String>;

    /// Scientific name
    fn name(&self, id: TaxId) -> TaxonomyResult<String>;
}
