use serde::Deserialize;

use super::{check_width, FeatureTransform, ModelError};

/// Feature normalizer exported by the trainer.
///
/// Zero scales and zero ranges divide by one, as the fitting library does
/// for constant columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalizer {
    /// `(x - mean) / scale`
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    /// `(x - min) / (max - min)`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    /// Row-wise unit L2 norm.
    L2 {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

impl Normalizer {
    /// Input width the normalizer was fit on, if it was fit per column.
    pub fn width(&self) -> Option<usize> {
        match self {
            Normalizer::Standard { mean, .. } => Some(mean.len()),
            Normalizer::MinMax { data_min, .. } => Some(data_min.len()),
            Normalizer::L2 { .. } => None,
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Normalizer::Standard { feature_names, .. }
            | Normalizer::MinMax { feature_names, .. }
            | Normalizer::L2 { feature_names } => feature_names.as_deref(),
        }
    }

    /// Parameter vectors must agree in length.
    pub fn is_consistent(&self) -> bool {
        match self {
            Normalizer::Standard { mean, scale, .. } => mean.len() == scale.len(),
            Normalizer::MinMax { data_min, data_max, .. } => data_min.len() == data_max.len(),
            Normalizer::L2 { .. } => true,
        }
    }
}

fn safe_divisor(d: f64) -> f64 {
    if d == 0.0 {
        1.0
    } else {
        d
    }
}

impl FeatureTransform for Normalizer {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        let out: Vec<f64> = match self {
            Normalizer::Standard { mean, scale, .. } => {
                check_width(features, mean.len())?;
                features
                    .iter()
                    .zip(mean.iter().zip(scale))
                    .map(|(x, (m, s))| (x - m) / safe_divisor(*s))
                    .collect()
            }
            Normalizer::MinMax {
                data_min, data_max, ..
            } => {
                check_width(features, data_min.len())?;
                features
                    .iter()
                    .zip(data_min.iter().zip(data_max))
                    .map(|(x, (lo, hi))| (x - lo) / safe_divisor(hi - lo))
                    .collect()
            }
            Normalizer::L2 { .. } => {
                let norm = features.iter().map(|x| x * x).sum::<f64>().sqrt();
                features.iter().map(|x| x / safe_divisor(norm)).collect()
            }
        };

        if let Some(i) = out.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite(i));
        }
        Ok(out)
    }
}
