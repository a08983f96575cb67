use metrics::counter;

use crate::inference::{Classifier, ModelError};
use crate::models::{Contribution, Feature, FEATURE_COUNT};

/// Number of contributions reported for a flagged address.
pub const TOP_K: usize = 3;

/// Attribute the classifier output for one normalized instance and keep the
/// `TOP_K` strongest contributions.
///
/// Explanation is an enrichment: any failure is logged and yields an empty
/// list, leaving the verdict untouched.
pub fn explain(classifier: &dyn Classifier, normalized: &[f64]) -> Vec<Contribution> {
    match attributions(classifier, normalized) {
        Ok(values) => top_contributions(&values, TOP_K),
        Err(e) => {
            counter!("explanation_failures_total").increment(1);
            tracing::warn!(error = %e, "Explanation unavailable");
            Vec::new()
        }
    }
}

fn attributions(classifier: &dyn Classifier, normalized: &[f64]) -> Result<Vec<f64>, ModelError> {
    let values = classifier.attribute(normalized)?;
    if values.len() != FEATURE_COUNT {
        return Err(ModelError::Dimension {
            expected: FEATURE_COUNT,
            actual: values.len(),
        });
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite(i));
    }
    Ok(values)
}

/// The `k` largest contributions by magnitude, sign kept, strongest first.
/// Equal magnitudes keep schema order.
pub fn top_contributions(values: &[f64], k: usize) -> Vec<Contribution> {
    let mut ranked: Vec<Contribution> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            Feature::from_index(i).map(|feature| Contribution { feature, value: *v })
        })
        .collect();

    // Stable: ties stay in schema order.
    ranked.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    ranked.truncate(k);
    ranked
}
