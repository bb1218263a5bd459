//! Batched similarity computation over fingerprint tensors.
//!
//! The Tanimoto coefficient is computed with basic tensor operations only
//! (square, sum, matmul, broadcast arithmetic), so the whole computation can
//! stay on the autodiff graph when the caller asks for it.

use candle_core::{DType, Tensor, D};

use crate::error::KernelResult;
use crate::metric::SimilarityMetric;
use crate::postprocess::Postprocess;

/// Batched pairwise similarity over fingerprint tensors.
///
/// Stateless apart from the postprocess captured at construction; one engine
/// can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    postprocess: Postprocess,
}

impl SimilarityEngine {
    /// Create an engine applying the given postprocess.
    #[must_use]
    pub fn new(postprocess: Postprocess) -> Self {
        Self { postprocess }
    }

    /// Postprocess this engine was built with.
    #[must_use]
    pub fn postprocess(&self) -> &Postprocess {
        &self.postprocess
    }

    /// Pairwise similarity matrix between the rows of `x1` and `x2`.
    ///
    /// `x1` has shape `[..., n, d]`, `x2` shape `[..., m, d]`; leading batch
    /// dimensions broadcast. Returns `[..., n, m]` with entries clamped at 0
    /// below (rounding near zero denominators can push them slightly
    /// negative; no upper clamp is applied).
    ///
    /// `x1_eq_x2` is an optimization hint. When the inputs are known to be
    /// element-wise identical and `differentiable` is false, one norm
    /// reduction is skipped and the diagonal is pinned to exactly 1, which
    /// the plain formula cannot guarantee under floating point. Beyond that
    /// diagonal patch the hint never changes the result.
    ///
    /// A pair of all-zero rows makes the Tanimoto ratio indeterminate (0/0);
    /// away from the pinned diagonal such entries resolve to 0 through the
    /// final clamp. Callers needing stricter behavior must pre-filter
    /// degenerate rows.
    ///
    /// With `differentiable` set, every shortcut is disabled and the output
    /// is a pure function of tensor ops, suitable for `backward()`.
    pub fn similarity(
        &self,
        x1: &Tensor,
        x2: &Tensor,
        metric: SimilarityMetric,
        x1_eq_x2: bool,
        apply_postprocess: bool,
        differentiable: bool,
    ) -> KernelResult<Tensor> {
        let res = match metric {
            SimilarityMetric::Tanimoto => self.tanimoto(x1, x2, x1_eq_x2, differentiable)?,
        };
        if apply_postprocess {
            Ok(self.postprocess.apply(&res)?)
        } else {
            Ok(res)
        }
    }

    /// Row-wise similarity between paired rows of `x1` and `x2`: the
    /// diagonal of the full matrix, computed without materializing it.
    ///
    /// Both inputs must carry the same number of points `n`; returns
    /// `[..., n]`. Clamping and the degenerate-row behavior match
    /// [`similarity`](Self::similarity).
    pub fn similarity_diag(
        &self,
        x1: &Tensor,
        x2: &Tensor,
        metric: SimilarityMetric,
        x1_eq_x2: bool,
        apply_postprocess: bool,
        differentiable: bool,
    ) -> KernelResult<Tensor> {
        let res = match metric {
            SimilarityMetric::Tanimoto => self.tanimoto_diag(x1, x2, x1_eq_x2, differentiable)?,
        };
        if apply_postprocess {
            Ok(self.postprocess.apply(&res)?)
        } else {
            Ok(res)
        }
    }

    /// Tanimoto similarity: `cross / (x1_norm + x2_norm - cross)` over the
    /// trailing two dimensions.
    fn tanimoto(
        &self,
        x1: &Tensor,
        x2: &Tensor,
        x1_eq_x2: bool,
        differentiable: bool,
    ) -> KernelResult<Tensor> {
        let fast_path = x1_eq_x2 && !differentiable;

        let x1_norm = x1.sqr()?.sum_keepdim(D::Minus1)?; // [..., n, 1]
        let x2_norm = if fast_path {
            x1_norm.clone()
        } else {
            x2.sqr()?.sum_keepdim(D::Minus1)? // [..., m, 1]
        };

        let cross = x1.broadcast_matmul(&x2.transpose(D::Minus2, D::Minus1)?.contiguous()?)?;
        let denominator = x1_norm
            .broadcast_add(&x2_norm.transpose(D::Minus2, D::Minus1)?)?
            .broadcast_sub(&cross)?;
        let mut res = cross.broadcast_div(&denominator)?;

        if fast_path {
            // Identical inputs: self-similarity is 1 by definition, and the
            // formula alone loses that to cancellation.
            res = fill_diagonal_ones(&res)?;
        }

        Ok(res.maximum(0f64)?)
    }

    /// Row-wise Tanimoto: `(x1 * x2).sum(-1)` replaces the cross matrix.
    fn tanimoto_diag(
        &self,
        x1: &Tensor,
        x2: &Tensor,
        x1_eq_x2: bool,
        differentiable: bool,
    ) -> KernelResult<Tensor> {
        if x1_eq_x2 && !differentiable {
            // Every row pairs with itself.
            let mut dims = x1.dims().to_vec();
            dims.pop();
            return Ok(Tensor::ones(dims, x1.dtype(), x1.device())?);
        }

        let cross = x1.broadcast_mul(x2)?.sum(D::Minus1)?; // [..., n]
        let x1_norm = x1.sqr()?.sum(D::Minus1)?;
        let x2_norm = x2.sqr()?.sum(D::Minus1)?;
        let denominator = x1_norm.broadcast_add(&x2_norm)?.broadcast_sub(&cross)?;
        let res = cross.broadcast_div(&denominator)?;

        Ok(res.maximum(0f64)?)
    }
}

/// Overwrite the diagonal of the trailing two dimensions with exactly 1,
/// including entries the formula left as NaN.
fn fill_diagonal_ones(res: &Tensor) -> candle_core::Result<Tensor> {
    let n = res.dim(D::Minus1)?;
    let eye = Tensor::eye(n, DType::U8, res.device())?.broadcast_as(res.dims())?;
    eye.where_cond(&res.ones_like()?, res)
}
