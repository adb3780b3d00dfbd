//! Snapshot file → EmbeddedClient → Gateway, end to end

use phageclouds_gateway::*;
use std::io::Write;

const SNAPSHOT: &str = r#"{
    "genomes": [
        {"accession": "MN001", "source": "NCBI", "genome_size": 48000, "taxonomy": "Caudoviricetes; Autographiviridae", "genus": "Teseptimavirus"},
        {"accession": "MN002", "source": "GPD_Isolate", "genome_size": 39000},
        {"accession": "MN003", "source": "GTDB_predicted_prophages", "genome_size": 21000}
    ],
    "shares_dna": [
        {"source": "MN001", "target": "MN002", "distance": 0.12},
        {"source": "MN003", "target": "MN001", "distance": 0.08}
    ],
    "infects": [
        {"genome": "MN001", "host_genus": "Escherichia"},
        {"genome": "MN003", "host_genus": "Escherichia"}
    ]
}"#;

async fn gateway_from_snapshot() -> Gateway {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();
    let client = EmbeddedClient::from_json_file(file.path()).unwrap();
    Gateway::connect(Box::new(client), FailurePolicy::Strict)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_host_neighborhood_from_snapshot() {
    let gateway = gateway_from_snapshot().await;

    let table = gateway
        .query_to_table(&Statement::SeedNeighborhood {
            seed: SeedFilter::InfectsHostGenus {
                genus: "Escherichia".to_string(),
                excluded_source: None,
            },
            threshold: 0.25,
        })
        .await
        .unwrap();

    assert_eq!(table.str_column("seed"), vec!["MN001", "MN003"]);
    assert_eq!(table.str_column("neighbor"), vec!["MN002", "MN001"]);
}

#[tokio::test]
async fn test_harsh_host_neighborhood_from_snapshot() {
    let gateway = gateway_from_snapshot().await;

    let table = gateway
        .query_to_table(&Statement::SeedNeighborhood {
            seed: SeedFilter::InfectsHostGenus {
                genus: "Escherichia".to_string(),
                excluded_source: Some("GTDB_predicted_prophages".to_string()),
            },
            threshold: 0.25,
        })
        .await
        .unwrap();

    assert_eq!(table.str_column("seed"), vec!["MN001"]);
}

#[tokio::test]
async fn test_missing_snapshot_is_io_error() {
    let result = EmbeddedClient::from_json_file("/nonexistent/phage_snapshot.json");
    assert!(matches!(result, Err(GatewayError::Io(_))));
}
