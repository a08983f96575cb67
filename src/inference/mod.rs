//! Trained-model capabilities consumed by the scoring pipeline.
//!
//! The pipeline only sees the `FeatureTransform` and `Classifier` traits, so
//! tests can inject stubs and the concrete artifact formats stay swappable.

pub mod artifacts;
pub mod boosted_trees;
pub mod normalizer;
mod tree_shap;

pub use artifacts::{ArtifactError, ModelArtifacts};
pub use boosted_trees::BoostedTrees;
pub use normalizer::Normalizer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("non-finite value produced at index {0}")]
    NonFinite(usize),

    #[error("invalid class probabilities: {0:?}")]
    Probabilities([f64; 2]),

    #[error("attribution not supported by this classifier")]
    AttributionUnsupported,

    #[error("malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },
}

/// Deterministic, stateless vector transform fit offline.
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Binary classifier with probability output.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<Prediction, ModelError>;

    /// Signed per-feature contributions to the positive-class output for a
    /// single instance, in input order.
    fn attribute(&self, _features: &[f64]) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::AttributionUnsupported)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// 0 or 1.
    pub class: u8,
    /// `[p(class 0), p(class 1)]`.
    pub probabilities: [f64; 2],
}

impl Prediction {
    /// Probability mass of the more likely class.
    pub fn confidence(&self) -> f64 {
        self.probabilities[0].max(self.probabilities[1])
    }

    /// Reject distributions outside `[0, 1]` or that don't sum to one.
    pub fn validate(self) -> Result<Self, ModelError> {
        let [p0, p1] = self.probabilities;
        let in_range = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_range(p0) || !in_range(p1) || ((p0 + p1) - 1.0).abs() > 1e-6 {
            return Err(ModelError::Probabilities(self.probabilities));
        }
        Ok(self)
    }
}

pub(crate) fn check_width(features: &[f64], expected: usize) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::Dimension {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}
