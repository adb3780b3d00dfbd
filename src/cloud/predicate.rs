//! Entry predicates: what a run is about

use crate::graph::{GenomeSource, Threshold};
use phageclouds_gateway::SeedFilter;
use serde::{Deserialize, Serialize};

/// Default threshold for taxon and host runs
pub const DEFAULT_THRESHOLD: f64 = 0.25;
/// Default threshold for family runs
pub const DEFAULT_FAMILY_THRESHOLD: f64 = 0.15;

/// How the seed genomes of a cloud are chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EntryPredicate {
    /// NCBI genomes whose lineage contains `taxon`
    TaxonSubstring { taxon: String },
    /// NCBI genomes whose lineage contains `family`, coloured by `rank`
    Family { family: String, rank: String },
    /// Genomes infecting a host of `genus`; `harsh` drops predicted
    /// prophages from the seeds
    HostGenus { genus: String, harsh: bool },
}

impl EntryPredicate {
    /// Source left out of harsh-mode seeds
    pub fn harsh_excluded_source() -> GenomeSource {
        GenomeSource::GtdbPredictedProphages
    }

    pub fn seed_filter(&self) -> SeedFilter {
        match self {
            EntryPredicate::TaxonSubstring { taxon } => SeedFilter::LineageContains {
                text: taxon.clone(),
            },
            EntryPredicate::Family { family, .. } => SeedFilter::LineageContains {
                text: family.clone(),
            },
            EntryPredicate::HostGenus { genus, harsh } => SeedFilter::InfectsHostGenus {
                genus: genus.clone(),
                excluded_source: harsh
                    .then(|| Self::harsh_excluded_source().as_str().to_string()),
            },
        }
    }

    pub fn default_threshold(&self) -> f64 {
        match self {
            EntryPredicate::Family { .. } => DEFAULT_FAMILY_THRESHOLD,
            _ => DEFAULT_THRESHOLD,
        }
    }

    /// The user-supplied value the run is named after
    pub fn subject(&self) -> &str {
        match self {
            EntryPredicate::TaxonSubstring { taxon } => taxon,
            EntryPredicate::Family { family, .. } => family,
            EntryPredicate::HostGenus { genus, .. } => genus,
        }
    }

    /// Output artifact name
    pub fn output_file_name(&self, threshold: Threshold) -> String {
        let token = threshold.file_token();
        match self {
            EntryPredicate::TaxonSubstring { taxon } => format!("{}_{}_clouds.html", taxon, token),
            EntryPredicate::Family { family, rank } => {
                format!("{}_{}_{}_clouds.html", family, token, rank)
            }
            EntryPredicate::HostGenus { genus, harsh: false } => {
                format!("{}_{}_clouds_v2.html", genus, token)
            }
            EntryPredicate::HostGenus { genus, harsh: true } => {
                format!("{}_{}_clouds_v2_harsh.html", genus, token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(v: f64) -> Threshold {
        Threshold::new(v).unwrap()
    }

    #[test]
    fn test_output_file_names() {
        let taxon = EntryPredicate::TaxonSubstring { taxon: "Tevenvirinae".into() };
        assert_eq!(taxon.output_file_name(t(0.25)), "Tevenvirinae_025_clouds.html");

        let family = EntryPredicate::Family { family: "Straboviridae".into(), rank: "genus".into() };
        assert_eq!(family.output_file_name(t(0.15)), "Straboviridae_015_genus_clouds.html");

        let host = EntryPredicate::HostGenus { genus: "Vibrio".into(), harsh: false };
        assert_eq!(host.output_file_name(t(0.3)), "Vibrio_03_clouds_v2.html");

        let harsh = EntryPredicate::HostGenus { genus: "Vibrio".into(), harsh: true };
        assert_eq!(harsh.output_file_name(t(0.25)), "Vibrio_025_clouds_v2_harsh.html");
    }

    #[test]
    fn test_seed_filters() {
        let harsh = EntryPredicate::HostGenus { genus: "Vibrio".into(), harsh: true };
        assert_eq!(
            harsh.seed_filter(),
            SeedFilter::InfectsHostGenus {
                genus: "Vibrio".into(),
                excluded_source: Some("GTDB_predicted_prophages".into()),
            }
        );
        let family = EntryPredicate::Family { family: "Straboviridae".into(), rank: "genus".into() };
        assert_eq!(family.seed_filter(), SeedFilter::LineageContains { text: "Straboviridae".into() });
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(EntryPredicate::TaxonSubstring { taxon: "x".into() }.default_threshold(), 0.25);
        assert_eq!(
            EntryPredicate::Family { family: "x".into(), rank: "genus".into() }.default_threshold(),
            0.15
        );
    }
}
