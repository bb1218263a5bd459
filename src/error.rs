//! Error types for fingerprint kernel operations.

use thiserror::Error;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Errors that can occur when computing fingerprint similarities.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Tensor operation failed. Shape mismatches and non-broadcastable batch
    /// dimensions surface here untranslated.
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Requested similarity metric is not implemented.
    #[error("Similarity metric '{requested}' not supported. Available options are: {available}")]
    UnsupportedMetric {
        requested: String,
        available: String,
    },

    /// Option combination the kernel cannot honor.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl KernelError {
    /// Create an unsupported-metric error listing the supported tags.
    pub fn unsupported_metric(requested: impl Into<String>) -> Self {
        Self::UnsupportedMetric {
            requested: requested.into(),
            available: crate::metric::SimilarityMetric::SUPPORTED.join(", "),
        }
    }

    /// Create an invalid-options error.
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
}
