//! Cloud extraction
//!
//! A cloud is the seed genomes of an entry predicate, their one-hop
//! `sharesDNA` neighbours within the threshold, and every edge within the
//! threshold between any two of those genomes.

pub mod predicate;

use crate::graph::{Accession, GenomeNode, SharesDnaEdge, Threshold};
use phageclouds_gateway::{Gateway, GatewayResult, Statement};
use std::collections::BTreeSet;
use tracing::{debug, info};

pub use predicate::{EntryPredicate, DEFAULT_FAMILY_THRESHOLD, DEFAULT_THRESHOLD};

/// Node and edge sets of one cloud
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cloud {
    /// Genomes matching the entry predicate
    pub seeds: BTreeSet<Accession>,
    /// Seeds plus neighbours; frozen once extracted
    pub nodes: BTreeSet<Accession>,
    /// Induced edges, storage direction preserved
    pub edges: Vec<SharesDnaEdge>,
}

impl Cloud {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Accessions in sorted order, as sent to the store
    pub fn accession_list(&self) -> Vec<String> {
        self.nodes.iter().map(|a| a.as_str().to_string()).collect()
    }
}

/// Extracts clouds through the gateway
pub struct CloudExtractor<'a> {
    gateway: &'a Gateway,
}

impl<'a> CloudExtractor<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Seed set and neighbour expansion, then the induced edge set
    pub async fn extract(&self, predicate: &EntryPredicate, threshold: Threshold) -> GatewayResult<Cloud> {
        let (seeds, nodes) = self.node_set(predicate, threshold).await?;
        info!(
            "Cloud for {:?}: {} seed(s), {} node(s)",
            predicate.subject(),
            seeds.len(),
            nodes.len()
        );

        let mut cloud = Cloud {
            seeds,
            nodes,
            edges: Vec::new(),
        };
        if cloud.is_empty() {
            return Ok(cloud);
        }

        cloud.edges = self.induced_edges(&cloud, threshold).await?;
        info!("Cloud has {} edge(s) within {}", cloud.edges.len(), threshold);
        Ok(cloud)
    }

    async fn node_set(
        &self,
        predicate: &EntryPredicate,
        threshold: Threshold,
    ) -> GatewayResult<(BTreeSet<Accession>, BTreeSet<Accession>)> {
        let table = self
            .gateway
            .query_to_table(&Statement::SeedNeighborhood {
                seed: predicate.seed_filter(),
                threshold: threshold.value(),
            })
            .await?;

        let seeds: BTreeSet<Accession> = table.str_column("seed").into_iter().map(Accession::from).collect();
        let mut nodes = seeds.clone();
        nodes.extend(table.str_column("neighbor").into_iter().map(Accession::from));
        Ok((seeds, nodes))
    }

    async fn induced_edges(&self, cloud: &Cloud, threshold: Threshold) -> GatewayResult<Vec<SharesDnaEdge>> {
        let table = self
            .gateway
            .query_to_table(&Statement::InducedEdges {
                accessions: cloud.accession_list(),
                threshold: threshold.value(),
            })
            .await?;

        let edges = SharesDnaEdge::from_table(&table)
            .into_iter()
            .filter(|edge| {
                let keep = threshold.admits(edge.distance)
                    && cloud.nodes.contains(&edge.source)
                    && cloud.nodes.contains(&edge.target);
                if !keep {
                    debug!(
                        "Dropping edge {} -> {} ({}) outside the cloud",
                        edge.source, edge.target, edge.distance
                    );
                }
                keep
            })
            .collect();
        Ok(edges)
    }

    /// Metadata rows for every genome of the cloud
    pub async fn node_metadata(&self, cloud: &Cloud) -> GatewayResult<Vec<GenomeNode>> {
        if cloud.is_empty() {
            return Ok(Vec::new());
        }
        let table = self
            .gateway
            .query_to_table(&Statement::NodeMetadata {
                accessions: cloud.accession_list(),
            })
            .await?;
        let nodes = GenomeNode::from_table(&table);
        debug!("Fetched {} metadata row(s) for {} node(s)", nodes.len(), cloud.nodes.len());
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phageclouds_gateway::{EmbeddedClient, FailurePolicy, GenomeRecord, PhageGraph};

    async fn gateway(graph: PhageGraph) -> Gateway {
        Gateway::connect(Box::new(EmbeddedClient::with_graph(graph)), FailurePolicy::Strict)
            .await
            .unwrap()
    }

    fn scenario() -> PhageGraph {
        let mut graph = PhageGraph::new();
        graph.add_genome(
            GenomeRecord::new("A001", "NCBI")
                .with_size(45_000)
                .with_taxonomy("Caudoviricetes; Straboviridae; Tevenvirinae"),
        );
        graph.add_genome(GenomeRecord::new("A002", "NCBI").with_size(39_000).with_taxonomy("Caudoviricetes"));
        graph.add_genome(GenomeRecord::new("A003", "Tara").with_size(30_000));
        graph.add_shares_dna("A001", "A002", 0.10);
        graph.add_shares_dna("A001", "A003", 0.30);
        graph.add_shares_dna("A002", "A003", 0.05);
        graph
    }

    #[tokio::test]
    async fn test_threshold_scenario() {
        let gw = gateway(scenario()).await;
        let cloud = CloudExtractor::new(&gw)
            .extract(
                &EntryPredicate::TaxonSubstring { taxon: "Tevenvirinae".into() },
                Threshold::new(0.25).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(cloud.seeds.len(), 1);
        assert_eq!(
            cloud.nodes.iter().map(Accession::as_str).collect::<Vec<_>>(),
            vec!["A001", "A002"]
        );
        assert_eq!(cloud.edges, vec![SharesDnaEdge::new("A001", "A002", 0.10)]);
    }

    #[tokio::test]
    async fn test_edges_are_induced_and_within_threshold() {
        let gw = gateway(scenario()).await;
        let threshold = Threshold::new(0.4).unwrap();
        let cloud = CloudExtractor::new(&gw)
            .extract(&EntryPredicate::TaxonSubstring { taxon: "Straboviridae".into() }, threshold)
            .await
            .unwrap();

        assert_eq!(cloud.nodes.len(), 3);
        assert_eq!(cloud.edges.len(), 3);
        for edge in &cloud.edges {
            assert!(threshold.admits(edge.distance));
            assert!(cloud.nodes.contains(&edge.source) && cloud.nodes.contains(&edge.target));
        }
    }

    #[tokio::test]
    async fn test_empty_seed_match() {
        let gw = gateway(scenario()).await;
        let extractor = CloudExtractor::new(&gw);
        let cloud = extractor
            .extract(&EntryPredicate::TaxonSubstring { taxon: "Autographiviridae".into() }, Threshold::new(0.25).unwrap())
            .await
            .unwrap();
        assert!(cloud.is_empty());
        assert!(cloud.edges.is_empty());
        assert!(extractor.node_metadata(&cloud).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_harsh_seed_still_reachable_as_neighbor() {
        let mut graph = PhageGraph::new();
        graph.add_genome(GenomeRecord::new("P001", "NCBI").with_size(40_000));
        graph.add_genome(GenomeRecord::new("P002", "GTDB_predicted_prophages").with_size(20_000));
        graph.add_genome(GenomeRecord::new("P003", "GTDB_predicted_prophages").with_size(20_000));
        graph.add_infects("P001", "Vibrio");
        graph.add_infects("P002", "Vibrio");
        graph.add_infects("P003", "Vibrio");
        graph.add_shares_dna("P001", "P002", 0.2);
        let gw = gateway(graph).await;

        let cloud = CloudExtractor::new(&gw)
            .extract(&EntryPredicate::HostGenus { genus: "Vibrio".into(), harsh: true }, Threshold::new(0.25).unwrap())
            .await
            .unwrap();

        let seeds: Vec<_> = cloud.seeds.iter().map(Accession::as_str).collect();
        let nodes: Vec<_> = cloud.nodes.iter().map(Accession::as_str).collect();
        assert_eq!(seeds, vec!["P001"]);
        assert_eq!(nodes, vec!["P001", "P002"]);
    }

    #[tokio::test]
    async fn test_node_metadata() {
        let gw = gateway(scenario()).await;
        let extractor = CloudExtractor::new(&gw);
        let cloud = extractor
            .extract(&EntryPredicate::TaxonSubstring { taxon: "Tevenvirinae".into() }, Threshold::new(0.25).unwrap())
            .await
            .unwrap();
        let nodes = extractor.node_metadata(&cloud).await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].derived_size(), 15);
    }
}
