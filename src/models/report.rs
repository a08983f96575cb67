use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;

use super::features::{Feature, FeatureRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Flagged,
    NotFlagged,
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Flagged => "flagged",
            Verdict::NotFlagged => "not_flagged",
            Verdict::Error => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed share of the classifier output attributed to one feature.
/// Positive pushes toward `flagged`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub feature: Feature,
    pub value: f64,
}

/// Serialized as a `[name, value]` pair.
impl Serialize for Contribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.feature.as_str())?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

// ---------------------------------------------------------------------------
// AnalysisReport: one per analysis request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub address: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub explanations: Vec<Contribution>,
    pub transaction_count: usize,
    pub features: FeatureRecord,
    pub analyzed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    /// Report for an analysis that could not produce a trustworthy verdict.
    /// Never carries a confidence or an explanation.
    pub fn failed(address: &str, reason: impl Into<String>) -> Self {
        Self {
            address: address.to_string(),
            verdict: Verdict::Error,
            confidence: 0.0,
            explanations: Vec::new(),
            transaction_count: 0,
            features: FeatureRecord::zeros(),
            analyzed_at: Utc::now(),
            error: Some(reason.into()),
        }
    }
}
