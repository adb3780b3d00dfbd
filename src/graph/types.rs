//! Core type definitions for phage clouds

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique genome identifier (the `accession` property)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Accession(String);

impl Accession {
    pub fn new(accession: impl Into<String>) -> Self {
        Accession(accession.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Accession {
    fn from(s: String) -> Self {
        Accession(s)
    }
}

impl From<&str> for Accession {
    fn from(s: &str) -> Self {
        Accession(s.to_string())
    }
}

/// A colour as the renderer understands it: a CSS name or `#rrggbb`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(color: impl Into<String>) -> Self {
        Color(color.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color(s.to_string())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("distance threshold must be a finite number, got {0}")]
pub struct InvalidThreshold(pub f64);

/// Distance threshold for a run.
///
/// The same value scopes neighbour expansion, the induced edge set and the
/// edge weights, so it is carried as one value rather than re-read per stage.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Offset added to every edge weight so edges at the threshold still draw
    pub const WEIGHT_OFFSET: f64 = 0.1;

    pub fn new(value: f64) -> Result<Self, InvalidThreshold> {
        if value.is_finite() {
            Ok(Threshold(value))
        } else {
            Err(InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whether an edge at `distance` belongs to the cloud
    pub fn admits(&self, distance: f64) -> bool {
        distance <= self.0
    }

    /// Renderer weight: closer genomes get thicker edges
    pub fn visual_weight(&self, distance: f64) -> f64 {
        self.0 - distance + Self::WEIGHT_OFFSET
    }

    /// Threshold with the decimal point removed, for output file names
    /// (`0.25` -> `025`, `1.0` -> `10`, `1e-5` -> `1e-05`)
    pub fn file_token(&self) -> String {
        let repr = format!("{:?}", self.0);
        // Exponents carry a sign and at least two digits in existing file names
        let repr = match repr.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => repr,
        };
        repr.replace('.', "")
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = InvalidThreshold;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Threshold::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}
