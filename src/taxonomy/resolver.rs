//! Name resolution and rank classification on top of a `TaxonomyLookup`

use super::{TaxId, TaxonomyError, TaxonomyLookup, TaxonomyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// What to do when a name maps to more than one identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Fail with `AmbiguousTaxon`
    #[default]
    Error,
    /// Take the numerically lowest identifier
    LowestId,
}

/// Taxonomy operations used by the annotator
pub struct TaxonomyResolver {
    lookup: Box<dyn TaxonomyLookup>,
    tie_break: TieBreak,
}

impl TaxonomyResolver {
    pub fn new(lookup: Box<dyn TaxonomyLookup>, tie_break: TieBreak) -> Self {
        Self { lookup, tie_break }
    }

    /// Identifier for a taxon name
    pub fn resolve_taxon_id(&self, name: &str) -> TaxonomyResult<TaxId> {
        let mut ids = self.lookup.ids_for_name(name)?;
        ids.sort();
        match ids.as_slice() {
            [] => Err(TaxonomyError::UnknownTaxon(name.to_string())),
            [only] => Ok(*only),
            [first, ..] => match self.tie_break {
                TieBreak::Error => Err(TaxonomyError::AmbiguousTaxon {
                    name: name.to_string(),
                    candidates: ids.clone(),
                }),
                TieBreak::LowestId => {
                    warn!("Taxon name {} matches {} identifiers, using {}", name, ids.len(), first);
                    Ok(*first)
                }
            },
        }
    }

    pub fn descendants_of(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>> {
        self.lookup.descendants(id)
    }

    pub fn lineage_of(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>> {
        self.lookup.lineage(id)
    }

    pub fn rank_of(&self, id: TaxId) -> TaxonomyResult<String> {
        self.lookup.rank(id)
    }

    pub fn name_of(&self, id: TaxId) -> TaxonomyResult<String> {
        self.lookup.name(id)
    }

    /// Name of the lineage member at `rank`, if the lineage has that rank
    pub fn classify_at_rank(&self, lineage: &[TaxId], rank: &str) -> TaxonomyResult<Option<String>> {
        for id in lineage {
            if self.lookup.rank(*id)? == rank {
                return Ok(Some(self.lookup.name(*id)?));
            }
        }
        Ok(None)
    }

    /// `classify_at_rank` over the lineage of `id`
    pub fn classify_taxid_at_rank(&self, id: TaxId, rank: &str) -> TaxonomyResult<Option<String>> {
        let lineage = self.lookup.lineage(id)?;
        self.classify_at_rank(&lineage, rank)
    }

    /// Every distinct name at `rank` found in the lineages of the taxa below
    /// `name`, sorted
    pub fn names_at_rank_below(&self, name: &str, rank: &str) -> TaxonomyResult<BTreeSet<String>> {
        let root = self.resolve_taxon_id(name)?;
        let mut seen: BTreeSet<TaxId> = BTreeSet::new();
        for descendant in self.lookup.descendants(root)? {
            seen.extend(self.lookup.lineage(descendant)?);
        }

        let mut names = BTreeSet::new();
        for id in seen {
            if self.lookup.rank(id)? == rank {
                names.insert(self.lookup.name(id)?);
            }
        }
        debug!("{} distinct {} names below {}", names.len(), rank, name);
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::memory::MemoryTaxonomy;
    use crate::taxonomy::sqlite::tests::fixture;

    fn resolver(tie_break: TieBreak) -> TaxonomyResolver {
        let mut t = MemoryTaxonomy::new();
        t.insert(1u64, None, "root", "no rank")
            .insert(10u64, Some(1), "Straboviridae", "family")
            .insert(20u64, Some(10), "Tevenvirinae", "subfamily")
            .insert(30u64, Some(20), "Tequatrovirus", "genus")
            .insert(31u64, Some(20), "Mosigvirus", "genus")
            .insert(40u64, Some(30), "Escherichia phage T4", "species")
            .insert(50u64, Some(1), "Ambiguous", "genus")
            .insert(51u64, Some(10), "Ambiguous", "genus");
        TaxonomyResolver::new(Box::new(t), tie_break)
    }

    #[test]
    fn test_unknown_name() {
        let err = resolver(TieBreak::Error).resolve_taxon_id("Nope").unwrap_err();
        assert!(matches!(err, TaxonomyError::UnknownTaxon(name) if name == "Nope"));
    }

    #[test]
    fn test_ambiguous_name_by_policy() {
        let err = resolver(TieBreak::Error).resolve_taxon_id("Ambiguous").unwrap_err();
        assert!(matches!(err, TaxonomyError::AmbiguousTaxon { ref candidates, .. } if candidates.len() == 2));
        assert_eq!(resolver(TieBreak::LowestId).resolve_taxon_id("Ambiguous").unwrap(), TaxId(50));
    }

    #[test]
    fn test_classify_at_rank() {
        let r = resolver(TieBreak::Error);
        assert_eq!(r.classify_taxid_at_rank(TaxId(40), "genus").unwrap().as_deref(), Some("Tequatrovirus"));
        assert_eq!(r.classify_taxid_at_rank(TaxId(40), "subfamily").unwrap().as_deref(), Some("Tevenvirinae"));
        assert_eq!(r.classify_taxid_at_rank(TaxId(20), "genus").unwrap(), None);
    }

    #[test]
    fn test_names_at_rank_below_family() {
        let r = resolver(TieBreak::Error);
        let genera: Vec<_> = r.names_at_rank_below("Straboviridae", "genus").unwrap().into_iter().collect();
        assert_eq!(genera, vec!["Ambiguous", "Mosigvirus", "Tequatrovirus"]);
        let subfamilies = r.names_at_rank_below("Straboviridae", "subfamily").unwrap();
        assert_eq!(subfamilies.len(), 1);
    }

    #[test]
    fn test_names_at_rank_below_with_sqlite_backend() {
        let r = TaxonomyResolver::new(Box::new(fixture()), TieBreak::Error);
        let genera: Vec<_> = r.names_at_rank_below("Straboviridae", "genus").unwrap().into_iter().collect();
        assert_eq!(genera, vec!["Mosigvirus", "Tequatrovirus"]);
    }
}
