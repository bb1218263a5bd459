//! Postprocessing of raw similarity matrices.

use std::fmt;
use std::sync::Arc;

use candle_core::Tensor;

type PostprocessFn = Arc<dyn Fn(&Tensor) -> candle_core::Result<Tensor> + Send + Sync>;

/// A named transformation applied to a raw similarity matrix before it is
/// returned to the caller.
///
/// The name is the cache key: two values compare equal when their names
/// match, so a kernel can tell whether an engine built for one postprocess
/// can serve a call requesting another. Callers registering a custom
/// postprocess must give behaviorally distinct closures distinct names.
#[derive(Clone)]
pub struct Postprocess {
    name: Arc<str>,
    func: PostprocessFn,
}

impl Postprocess {
    /// Create a named postprocess from a closure.
    pub fn new(
        name: impl Into<Arc<str>>,
        func: impl Fn(&Tensor) -> candle_core::Result<Tensor> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Identity postprocess; returns the matrix unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::new("identity", |res| Ok(res.clone()))
    }

    /// Name under which this postprocess is cached.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the transformation to a raw similarity matrix.
    pub fn apply(&self, res: &Tensor) -> candle_core::Result<Tensor> {
        (self.func)(res)
    }
}

impl Default for Postprocess {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Postprocess {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Postprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Postprocess")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
