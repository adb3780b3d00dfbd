//! Accession → taxonomy identifier side file
//!
//! Two comma-separated columns per line: `accession,taxid`.

use super::{TaxId, TaxonomyError, TaxonomyResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct AccessionTaxids {
    map: HashMap<String, TaxId>,
}

impl AccessionTaxids {
    /// Load the mapping file. A missing or unreadable file is an error.
    pub fn load(path: impl AsRef<Path>) -> TaxonomyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::MappingFile {
            path: path.display().to_string(),
            source,
        })?;
        let mapping = Self::parse(&raw)?;
        info!("Loaded {} accession taxids from {:?}", mapping.len(), path);
        Ok(mapping)
    }

    pub fn parse(raw: &str) -> TaxonomyResult<Self> {
        let mut map = HashMap::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || TaxonomyError::MalformedMapping {
                line: idx + 1,
                content: line.to_string(),
            };
            let (accession, taxid) = line.split_once(',').ok_or_else(malformed)?;
            let taxid = taxid.trim().parse::<u64>().map_err(|_| malformed())?;
            map.insert(accession.trim().to_string(), TaxId(taxid));
        }
        Ok(Self { map })
    }

    pub fn get(&self, accession: &str) -> Option<TaxId> {
        self.map.get(accession).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(String, TaxId)> for AccessionTaxids {
    fn from_iter<I: IntoIterator<Item = (String, TaxId)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
