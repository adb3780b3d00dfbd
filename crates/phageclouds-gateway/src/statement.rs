//! Read statements understood by the phage graph gateway
//!
//! The store is only ever queried with a handful of simple pattern matches.
//! They are modelled as a closed enum so the remote client can render them
//! to parameterised Cypher and the embedded client can evaluate them
//! directly, with both sides agreeing on the column layout.

use serde_json::{json, Map, Value};
use std::fmt;

/// Node label of genome nodes
pub const GENOME_LABEL: &str = "PhageGenome";
/// Node label of bacterial hosts
pub const HOST_LABEL: &str = "Host";
/// Relationship carrying the genomic distance
pub const SHARES_DNA: &str = "sharesDNA";
/// Relationship from a genome to its host
pub const INFECTS: &str = "infects";
/// Source tag of reference genomes
pub const NCBI_SOURCE: &str = "NCBI";

/// Which genomes seed a cloud
#[derive(Debug, Clone, PartialEq)]
pub enum SeedFilter {
    /// NCBI genomes whose lineage text contains `text`
    LineageContains { text: String },
    /// Genomes infecting a host of `genus`, optionally skipping one source
    InfectsHostGenus {
        genus: String,
        excluded_source: Option<String>,
    },
}

/// A read statement against the phage graph
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Seeds plus their outgoing `sharesDNA` neighbours within `threshold`.
    ///
    /// Columns: `seed`, `neighbor` (null for seeds without a qualifying edge).
    SeedNeighborhood { seed: SeedFilter, threshold: f64 },

    /// Metadata for the given genomes.
    ///
    /// Columns: `accession`, `source`, `genome_size`, `taxonomy`, `genus`,
    /// `host_genus` (one row per host; null when the genome has none).
    NodeMetadata { accessions: Vec<String> },

    /// `sharesDNA` edges with both endpoints in `accessions` and distance
    /// within `threshold`.
    ///
    /// Columns: `source`, `target`, `distance`.
    InducedEdges {
        accessions: Vec<String>,
        threshold: f64,
    },
}

/// Cypher text plus its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    pub text: String,
    pub parameters: Map<String, Value>,
}

impl fmt::Display for CypherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if !self.parameters.is_empty() {
            write!(f, " {}", Value::Object(self.parameters.clone()))?;
        }
        Ok(())
    }
}

impl Statement {
    /// Column names produced by this statement, in order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Statement::SeedNeighborhood { .. } => &["seed", "neighbor"],
            Statement::NodeMetadata { .. } => &[
                "accession",
                "source",
                "genome_size",
                "taxonomy",
                "genus",
                "host_genus",
            ],
            Statement::InducedEdges { .. } => &["source", "target", "distance"],
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Statement::SeedNeighborhood { .. } => "seed_neighborhood",
            Statement::NodeMetadata { .. } => "node_metadata",
            Statement::InducedEdges { .. } => "induced_edges",
        }
    }

    /// Render as parameterised Cypher
    pub fn to_cypher(&self) -> CypherQuery {
        let mut parameters = Map::new();
        let text = match self {
            Statement::SeedNeighborhood { seed, threshold } => {
                parameters.insert("threshold".into(), json!(threshold));
                let seed_match = match seed {
                    SeedFilter::LineageContains { text } => {
                        parameters.insert("source".into(), json!(NCBI_SOURCE));
                        parameters.insert("text".into(), json!(text));
                        format!(
                            "MATCH (a:{GENOME_LABEL} {{source: $source}}) WHERE a.taxonomy CONTAINS $text"
                        )
                    }
                    SeedFilter::InfectsHostGenus {
                        genus,
                        excluded_source,
                    } => {
                        parameters.insert("genus".into(), json!(genus));
                        let mut clause = format!(
                            "MATCH (a:{GENOME_LABEL})-[:{INFECTS}]->(:{HOST_LABEL} {{genus: $genus}})"
                        );
                        if let Some(excluded) = excluded_source {
                            parameters.insert("excluded".into(), json!(excluded));
                            clause.push_str(" WHERE a.source <> $excluded");
                        }
                        clause
                    }
                };
                // DISTINCT because a genome with two hosts of the same genus
                // would otherwise seed twice.
                format!(
                    "{seed_match} WITH DISTINCT a \
                     OPTIONAL MATCH (a)-[r:{SHARES_DNA}]->(b:{GENOME_LABEL}) WHERE r.distance <= $threshold \
                     RETURN a.accession AS seed, b.accession AS neighbor"
                )
            }
            Statement::NodeMetadata { accessions } => {
                parameters.insert("accessions".into(), json!(accessions));
                format!(
                    "MATCH (a:{GENOME_LABEL}) WHERE a.accession IN $accessions \
                     OPTIONAL MATCH (a)-[:{INFECTS}]->(h:{HOST_LABEL}) \
                     RETURN a.accession AS accession, a.source AS source, a.genome_size AS genome_size, \
                     a.taxonomy AS taxonomy, a.genus AS genus, h.genus AS host_genus"
                )
            }
            Statement::InducedEdges {
                accessions,
                threshold,
            } => {
                parameters.insert("accessions".into(), json!(accessions));
                parameters.insert("threshold".into(), json!(threshold));
                format!(
                    "MATCH (a:{GENOME_LABEL})-[r:{SHARES_DNA}]->(b:{GENOME_LABEL}) \
                     WHERE a.accession IN $accessions AND b.accession IN $accessions AND r.distance <= $threshold \
                     RETURN a.accession AS source, b.accession AS target, r.distance AS distance"
                )
            }
        };

        CypherQuery { text, parameters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_seed_is_parameterised() {
        let stmt = Statement::SeedNeighborhood {
            seed: SeedFilter::LineageContains {
                text: "Tevenvirinae".to_string(),
            },
            threshold: 0.25,
        };
        let query = stmt.to_cypher();
        assert!(query.text.contains("a.taxonomy CONTAINS $text"));
        assert!(query.text.contains("OPTIONAL MATCH"));
        assert!(!query.text.contains("Tevenvirinae"));
        assert_eq!(query.parameters["text"], json!("Tevenvirinae"));
        assert_eq!(query.parameters["source"], json!("NCBI"));
        assert_eq!(query.parameters["threshold"], json!(0.25));
    }

    #[test]
    fn test_host_seed_excludes_source_only_when_asked() {
        let lenient = Statement::SeedNeighborhood {
            seed: SeedFilter::InfectsHostGenus {
                genus: "Escherichia".to_string(),
                excluded_source: None,
            },
            threshold: 0.25,
        }
        .to_cypher();
        assert!(!lenient.text.contains("$excluded"));
        assert!(!lenient.parameters.contains_key("excluded"));

        let harsh = Statement::SeedNeighborhood {
            seed: SeedFilter::InfectsHostGenus {
                genus: "Escherichia".to_string(),
                excluded_source: Some("GTDB_predicted_prophages".to_string()),
            },
            threshold: 0.25,
        }
        .to_cypher();
        assert!(harsh.text.contains("a.source <> $excluded"));
        assert_eq!(harsh.parameters["excluded"], json!("GTDB_predicted_prophages"));
        assert_eq!(harsh.parameters["genus"], json!("Escherichia"));
    }

    #[test]
    fn test_induced_edges_uses_same_threshold_for_both_ends() {
        let query = Statement::InducedEdges {
            accessions: vec!["A001".into(), "A002".into()],
            threshold: 0.15,
        }
        .to_cypher();
        assert!(query.text.contains("a.accession IN $accessions AND b.accession IN $accessions"));
        assert_eq!(query.parameters["accessions"], json!(["A001", "A002"]));
        assert_eq!(query.parameters["threshold"], json!(0.15));
    }

    #[test]
    fn test_columns_match_return_clause() {
        let statements = [
            Statement::SeedNeighborhood {
                seed: SeedFilter::LineageContains { text: "x".into() },
                threshold: 0.1,
            },
            Statement::NodeMetadata { accessions: vec![] },
            Statement::InducedEdges {
                accessions: vec![],
                threshold: 0.1,
            },
        ];
        for stmt in statements {
            let text = stmt.to_cypher().text;
            for column in stmt.columns() {
                assert!(text.contains(&format!("AS {}", column)), "{} missing {}", stmt.name(), column);
            }
        }
    }
}
