//! Fingerprint kernel: the covariance-function adapter over the engine.
//!
//! Wraps [`SimilarityEngine`] behind the two-input `forward` contract GP
//! frameworks expect, handles batch-layout reinterpretation, and caches the
//! engine so repeated calls with the same postprocess reuse it. Outer
//! scaling and hyperparameter wrappers belong to the consuming framework.

use candle_core::{DType, Tensor, D};

use crate::error::{KernelError, KernelResult};
use crate::metric::SimilarityMetric;
use crate::postprocess::Postprocess;
use crate::similarity::SimilarityEngine;

/// Per-call options for [`FingerprintKernel::forward`].
#[derive(Clone, Debug)]
pub struct KernelOptions {
    /// Treat the last feature axis as an extra batch axis: `[..., n, d]`
    /// becomes `[..., d, n, 1]`, so each feature yields its own `n x n`
    /// similarity matrix.
    pub last_dim_is_batch: bool,
    /// Return only the row-wise similarities `[..., n]` instead of the full
    /// matrix.
    pub diag: bool,
    /// Apply the postprocess to the raw similarity matrix.
    pub apply_postprocess: bool,
    /// Keep every operation on the autodiff graph, disabling the shortcuts
    /// that reuse reductions or pin the diagonal.
    pub differentiable: bool,
    /// Transformation applied when `apply_postprocess` is set. Also the
    /// engine cache key.
    pub postprocess: Postprocess,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            last_dim_is_batch: false,
            diag: false,
            apply_postprocess: true,
            differentiable: false,
            postprocess: Postprocess::identity(),
        }
    }
}

impl KernelOptions {
    /// Set whether the last feature axis is treated as a batch axis.
    #[must_use]
    pub fn with_last_dim_is_batch(mut self, last_dim_is_batch: bool) -> Self {
        self.last_dim_is_batch = last_dim_is_batch;
        self
    }

    /// Set diagonal-only output.
    #[must_use]
    pub fn with_diag(mut self, diag: bool) -> Self {
        self.diag = diag;
        self
    }

    /// Set whether the postprocess is applied.
    #[must_use]
    pub fn with_apply_postprocess(mut self, apply_postprocess: bool) -> Self {
        self.apply_postprocess = apply_postprocess;
        self
    }

    /// Set whether the computation must stay differentiable.
    #[must_use]
    pub fn with_differentiable(mut self, differentiable: bool) -> Self {
        self.differentiable = differentiable;
        self
    }

    /// Set the postprocess.
    #[must_use]
    pub fn with_postprocess(mut self, postprocess: Postprocess) -> Self {
        self.postprocess = postprocess;
        self
    }
}

/// Covariance kernel over fingerprint batches.
///
/// `forward` takes `&mut self` for the engine cache, so a kernel instance is
/// single-writer by construction; share one per execution context, or wrap
/// it in a lock if a framework insists on sharing across threads.
///
/// ```ignore
/// use candle_core::{Device, Tensor};
/// use fingerprint_kernels_rs::{FingerprintKernel, KernelOptions};
///
/// let device = Device::Cpu;
/// let x = Tensor::new(&[[1f32, 0.0, 1.0, 0.0]], &device)?;
/// let mut kernel = FingerprintKernel::tanimoto();
/// let cov = kernel.forward(&x, &x, &KernelOptions::default())?;
/// ```
#[derive(Debug, Default)]
pub struct FingerprintKernel {
    metric: SimilarityMetric,
    engine: Option<SimilarityEngine>,
    engine_builds: usize,
}

impl FingerprintKernel {
    /// Create a kernel computing the given metric.
    #[must_use]
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            metric,
            engine: None,
            engine_builds: 0,
        }
    }

    /// Tanimoto (generalized Jaccard) kernel.
    #[must_use]
    pub fn tanimoto() -> Self {
        Self::new(SimilarityMetric::Tanimoto)
    }

    /// Metric this kernel computes.
    #[must_use]
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Number of engine builds so far. Repeated calls with an equal
    /// postprocess must not increment this.
    #[must_use]
    pub fn engine_builds(&self) -> usize {
        self.engine_builds
    }

    /// Compute the similarity matrix between `x1` (`[..., n, d]`) and `x2`
    /// (`[..., m, d]`).
    ///
    /// Output shape is `[..., n, m]`, or `[..., n]` with
    /// [`diag`](KernelOptions::diag), with the extra leading feature axis
    /// when [`last_dim_is_batch`](KernelOptions::last_dim_is_batch) is set.
    ///
    /// Whether the inputs are identical is established by full element-wise
    /// comparison, never by pointer identity, so the engine's exact-diagonal
    /// patch triggers only for genuinely equal inputs.
    pub fn forward(
        &mut self,
        x1: &Tensor,
        x2: &Tensor,
        options: &KernelOptions,
    ) -> KernelResult<Tensor> {
        let (x1, x2) = if options.last_dim_is_batch {
            (to_per_feature_batch(x1)?, to_per_feature_batch(x2)?)
        } else {
            (x1.clone(), x2.clone())
        };

        if options.diag {
            let (n, m) = (x1.dim(D::Minus2)?, x2.dim(D::Minus2)?);
            if n != m {
                return Err(KernelError::invalid_options(format!(
                    "diag mode needs matching point counts, got {n} and {m}"
                )));
            }
        }

        let x1_eq_x2 = tensors_equal(&x1, &x2)?;
        let metric = self.metric;
        let engine = self.engine_for(&options.postprocess);

        if options.diag {
            engine.similarity_diag(
                &x1,
                &x2,
                metric,
                x1_eq_x2,
                options.apply_postprocess,
                options.differentiable,
            )
        } else {
            engine.similarity(
                &x1,
                &x2,
                metric,
                x1_eq_x2,
                options.apply_postprocess,
                options.differentiable,
            )
        }
    }

    /// Return the cached engine, rebuilding it when none exists or the
    /// requested postprocess differs from the cached one.
    fn engine_for(&mut self, postprocess: &Postprocess) -> &SimilarityEngine {
        let stale = self
            .engine
            .as_ref()
            .map_or(true, |engine| engine.postprocess() != postprocess);
        if stale {
            tracing::debug!(
                postprocess = postprocess.name(),
                builds = self.engine_builds + 1,
                "building similarity engine"
            );
            self.engine = None;
            self.engine_builds += 1;
        }
        self.engine
            .get_or_insert_with(|| SimilarityEngine::new(postprocess.clone()))
    }
}

/// `[..., n, d]` -> `[..., d, n, 1]`: every feature becomes its own
/// single-feature batch of points.
fn to_per_feature_batch(x: &Tensor) -> candle_core::Result<Tensor> {
    x.transpose(D::Minus2, D::Minus1)?.unsqueeze(D::Minus1)
}

/// Full tensor equality: shape, dtype, and every element.
fn tensors_equal(x1: &Tensor, x2: &Tensor) -> candle_core::Result<bool> {
    if x1.dims() != x2.dims() || x1.dtype() != x2.dtype() {
        return Ok(false);
    }
    let matches = x1
        .eq(x2)?
        .to_dtype(DType::U32)?
        .sum_all()?
        .to_scalar::<u32>()?;
    Ok(matches as usize == x1.elem_count())
}
