//! # fingerprint-kernels-rs
//!
//! Tanimoto similarity kernels over molecular fingerprints (bit or count
//! vectors), for use as covariance functions in Gaussian Process regression.
//! All math runs on `candle` tensors with batched, broadcastable inputs, and
//! can stay on the autodiff graph when a caller needs gradients.
//!
//! ## Quick start
//!
//! ```ignore
//! use candle_core::{Device, Tensor};
//! use fingerprint_kernels_rs::{FingerprintKernel, KernelOptions};
//!
//! let device = Device::Cpu;
//! // Three 2048-bit fingerprints, shape [3, 2048].
//! let x = load_fingerprints(&device)?;
//!
//! let mut kernel = FingerprintKernel::tanimoto();
//! let cov = kernel.forward(&x, &x, &KernelOptions::default())?;
//! // cov is [3, 3] with a bit-exact unit diagonal.
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types and the [`KernelResult`] alias
//! - [`kernel`]: [`FingerprintKernel`] adapter with engine caching and
//!   batch-layout options
//! - [`metric`]: The closed [`SimilarityMetric`] set
//! - [`postprocess`]: Named [`Postprocess`] transformations (the engine
//!   cache key)
//! - [`similarity`]: The pure batched [`SimilarityEngine`]

pub mod error;
pub mod kernel;
pub mod metric;
pub mod postprocess;
pub mod similarity;

pub use error::{KernelError, KernelResult};
pub use kernel::{FingerprintKernel, KernelOptions};
pub use metric::SimilarityMetric;
pub use postprocess::Postprocess;
pub use similarity::SimilarityEngine;
