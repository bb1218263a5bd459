//! Similarity metrics for fingerprint vectors.
//!
//! The metric set is closed: adding one means adding a variant here and a
//! dispatch arm in [`SimilarityEngine`](crate::similarity::SimilarityEngine),
//! not subclassing a kernel type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Similarity metric for fingerprint batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Generalized Jaccard coefficient for real-valued vectors:
    /// `⟨x,y⟩ / (‖x‖² + ‖y‖² − ⟨x,y⟩)`.
    #[default]
    Tanimoto,
}

impl SimilarityMetric {
    /// Names of all supported metrics, as accepted by [`FromStr`].
    pub const SUPPORTED: &'static [&'static str] = &["tanimoto"];

    /// Canonical lowercase name of the metric.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SimilarityMetric::Tanimoto => "tanimoto",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMetric {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tanimoto" => Ok(SimilarityMetric::Tanimoto),
            _ => Err(KernelError::unsupported_metric(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tanimoto() {
        assert_eq!(
            "tanimoto".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::Tanimoto
        );
        assert_eq!(
            "Tanimoto".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::Tanimoto
        );
    }

    #[test]
    fn rejects_unknown_metric() {
        let err = "euclidean".parse::<SimilarityMetric>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("euclidean"), "message should echo the request: {msg}");
        assert!(msg.contains("tanimoto"), "message should list supported tags: {msg}");
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        let json = serde_json::to_string(&SimilarityMetric::Tanimoto).unwrap();
        assert_eq!(json, "\"tanimoto\"");
        let back: SimilarityMetric = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SimilarityMetric::Tanimoto);
    }
}
