use crate::inference::{ArtifactError, ModelArtifacts, ModelError};
use crate::models::{Contribution, FeatureRecord, Verdict};

use super::explainer;

/// Outcome of scoring one feature record.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub verdict: Verdict,
    /// Probability of the predicted class. Zero for `error` and for the
    /// empty-history short-circuit.
    pub confidence: f64,
    /// Model input, kept for explanation. `None` when the model never ran.
    pub normalized: Option<Vec<f64>>,
    pub error: Option<String>,
}

impl Score {
    fn empty_history() -> Self {
        Self {
            verdict: Verdict::NotFlagged,
            confidence: 0.0,
            normalized: None,
            error: None,
        }
    }

    fn failed(reason: String) -> Self {
        Self {
            verdict: Verdict::Error,
            confidence: 0.0,
            normalized: None,
            error: Some(reason),
        }
    }
}

/// Turns feature records into verdicts using the process-wide artifacts.
///
/// Construct once at startup; a load failure is kept so every later request
/// reports `error` instead of a guess.
#[derive(Clone)]
pub struct ScoringEngine {
    artifacts: Result<ModelArtifacts, String>,
}

impl ScoringEngine {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self {
            artifacts: Ok(artifacts),
        }
    }

    /// Engine whose artifacts could not be loaded.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            artifacts: Err(reason.into()),
        }
    }

    pub fn from_load(result: Result<ModelArtifacts, ArtifactError>) -> Self {
        match result {
            Ok(artifacts) => Self::new(artifacts),
            Err(e) => {
                tracing::error!(error = %e, "Model artifacts unavailable, every analysis will report an error");
                Self::unavailable(format!("model artifacts unavailable: {e}"))
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.artifacts.is_ok()
    }

    pub fn score(&self, features: &FeatureRecord) -> Score {
        // An unused account is never fed to a model trained on activity.
        if features.is_all_zero() {
            return Score::empty_history();
        }

        let artifacts = match &self.artifacts {
            Ok(a) => a,
            Err(reason) => return Score::failed(reason.clone()),
        };

        match infer(artifacts, features) {
            Ok(score) => score,
            Err(e) => {
                tracing::error!(error = %e, "Scoring failed");
                Score::failed(format!("scoring failed: {e}"))
            }
        }
    }

    /// Top contributions behind a `flagged` score; empty for anything else.
    pub fn explain(&self, score: &Score) -> Vec<Contribution> {
        if score.verdict != Verdict::Flagged {
            return Vec::new();
        }
        match (&self.artifacts, &score.normalized) {
            (Ok(artifacts), Some(normalized)) => {
                explainer::explain(artifacts.classifier.as_ref(), normalized)
            }
            _ => Vec::new(),
        }
    }
}

fn infer(artifacts: &ModelArtifacts, features: &FeatureRecord) -> Result<Score, ModelError> {
    let normalized = artifacts.normalizer.transform(features.as_slice())?;
    let prediction = artifacts.classifier.predict(&normalized)?.validate()?;

    let verdict = match prediction.class {
        1 => Verdict::Flagged,
        _ => Verdict::NotFlagged,
    };

    Ok(Score {
        verdict,
        confidence: prediction.confidence(),
        normalized: Some(normalized),
        error: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
