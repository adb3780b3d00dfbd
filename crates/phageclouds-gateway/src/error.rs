//! Error types for the phage graph gateway

use thiserror::Error;

/// Errors that can occur while talking to the phage graph store
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Query was rejected or failed during execution
    #[error("Query error: {0}")]
    Query(String),

    /// Store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Gateway was marked unavailable after a failed connection
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (snapshot files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
