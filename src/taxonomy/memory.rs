//! In-memory taxonomy tree

use super::{TaxId, TaxonomyError, TaxonomyLookup, TaxonomyResult};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
struct Taxon {
    parent: Option<TaxId>,
    name: String,
    rank: String,
}

/// Taxonomy tree held in memory. Children are kept sorted by id.
#[derive(Debug, Default, Clone)]
pub struct MemoryTaxonomy {
    taxa: HashMap<TaxId, Taxon>,
    children: BTreeMap<TaxId, Vec<TaxId>>,
}

impl MemoryTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a taxon. `parent` is `None` for the root.
    pub fn insert(
        &mut self,
        id: impl Into<TaxId>,
        parent: Option<u64>,
        name: impl Into<String>,
        rank: impl Into<String>,
    ) -> &mut Self {
        let id = id.into();
        let parent = parent.map(TaxId).filter(|p| *p != id);
        if let Some(parent) = parent {
            let siblings = self.children.entry(parent).or_default();
            siblings.push(id);
            siblings.sort();
        }
        self.taxa.insert(
            id,
            Taxon {
                parent,
                name: name.into(),
                rank: rank.into(),
            },
        );
        self
    }

    fn get(&self, id: TaxId) -> TaxonomyResult<&Taxon> {
        self.taxa.get(&id).ok_or(TaxonomyError::UnknownTaxId(id))
    }
}

impl TaxonomyLookup for MemoryTaxonomy {
    fn ids_for_name(&self, name: &str) -> TaxonomyResult<Vec<TaxId>> {
        let mut ids: Vec<TaxId> = self
            .taxa
            .iter()
            .filter(|(_, taxon)| taxon.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn descendants(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>> {
        self.get(id)?;
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.children.get(&current) {
                for child in children.iter().rev() {
                    if visited.insert(*child) {
                        out.push(*child);
                        stack.push(*child);
                    }
                }
            }
        }
        out.sort();
        Ok(out)
    }

    fn lineage(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>> {
        let mut path = vec![id];
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            if path.contains(&parent) {
                break;
            }
            path.push(parent);
            current = self.get(parent)?;
        }
        path.reverse();
        Ok(path)
    }

    fn rank(&self, id: TaxId) -> TaxonomyResult<String> {
        Ok(self.get(id)?.rank.clone())
    }

    fn name(&self, id: TaxId) -> TaxonomyResult<String> {
        Ok(self.get(id)?.name.clone())
    }
}
