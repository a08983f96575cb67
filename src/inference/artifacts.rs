use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{BoostedTrees, Classifier, FeatureTransform, ModelError, Normalizer};
use crate::models::{Feature, FEATURE_COUNT};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} does not match the feature schema: {reason}")]
    Schema {
        artifact: &'static str,
        reason: String,
    },

    #[error("invalid classifier: {0}")]
    Model(#[from] ModelError),
}

/// The trained normalizer and classifier. Loaded once per process and
/// shared read-only by every analysis.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub normalizer: Arc<dyn FeatureTransform>,
    pub classifier: Arc<dyn Classifier>,
}

impl ModelArtifacts {
    pub fn new(normalizer: Arc<dyn FeatureTransform>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    /// Load and validate both JSON artifacts.
    pub fn load(normalizer_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        let normalizer: Normalizer = read_json(normalizer_path)?;
        check_normalizer(&normalizer)?;

        let model: BoostedTrees = read_json(model_path)?;
        check_model(&model)?;

        tracing::info!(
            normalizer = %normalizer_path.display(),
            model = %model_path.display(),
            trees = model.trees.len(),
            "Model artifacts loaded"
        );

        Ok(Self::new(Arc::new(normalizer), Arc::new(model)))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_normalizer(normalizer: &Normalizer) -> Result<(), ArtifactError> {
    let schema_error = |reason: String| ArtifactError::Schema {
        artifact: "normalizer",
        reason,
    };

    if !normalizer.is_consistent() {
        return Err(schema_error("parameter vectors differ in length".into()));
    }
    if let Some(width) = normalizer.width() {
        if width != FEATURE_COUNT {
            return Err(schema_error(format!(
                "fit on {width} features, expected {FEATURE_COUNT}"
            )));
        }
    }
    if let Some(names) = normalizer.feature_names() {
        check_names(names).map_err(schema_error)?;
    }
    Ok(())
}

fn check_model(model: &BoostedTrees) -> Result<(), ArtifactError> {
    let schema_error = |reason: String| ArtifactError::Schema {
        artifact: "classifier",
        reason,
    };

    if model.num_features != FEATURE_COUNT {
        return Err(schema_error(format!(
            "trained on {} features, expected {FEATURE_COUNT}",
            model.num_features
        )));
    }
    if let Some(names) = &model.feature_names {
        check_names(names).map_err(schema_error)?;
    }
    model.validate()?;
    Ok(())
}

/// Names must list the schema field-for-field, in order.
fn check_names(names: &[String]) -> Result<(), String> {
    if names.len() != FEATURE_COUNT {
        return Err(format!("{} feature names, expected {FEATURE_COUNT}", names.len()));
    }
    for (i, (name, feature)) in names.iter().zip(Feature::ALL).enumerate() {
        if !feature.matches(name) {
            return Err(format!("position {i} is `{name}`, expected `{feature}`"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_names() -> Vec<String> {
        Feature::ALL.iter().map(|f| f.as_str().to_string()).collect()
    }

    #[test]
    fn test_names_accept_either_naming() {
        assert!(check_names(&schema_names()).is_ok());

        let labels: Vec<String> = Feature::ALL.iter().map(|f| f.column_label().to_string()).collect();
        assert!(check_names(&labels).is_ok());
    }

    #[test]
    fn test_names_reject_reordering() {
        let mut names = schema_names();
        names.swap(3, 4);
        let err = check_names(&names).unwrap_err();
        assert!(err.contains("position 3"));

        names.truncate(20);
        assert!(check_names(&names).is_err());
    }

    #[test]
    fn test_normalizer_width_checked() {
        let narrow = Normalizer::Standard {
            mean: vec![0.0; 20],
            scale: vec![1.0; 20],
            feature_names: None,
        };
        assert!(matches!(
            check_normalizer(&narrow),
            Err(ArtifactError::Schema { artifact: "normalizer", .. })
        ));

        let l2 = Normalizer::L2 {
            feature_names: Some(schema_names()),
        };
        assert!(check_normalizer(&l2).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ModelArtifacts::load(
            Path::new("/nonexistent/normalizer.json"),
            Path::new("/nonexistent/model.json"),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }
}
