use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use walletscan::inference::{Classifier, FeatureTransform, ModelArtifacts, ModelError, Prediction};
use walletscan::ingestion::Analyzer;
use walletscan::intelligence::ScoringEngine;
use walletscan::ledger::{LedgerError, LedgerSource};
use walletscan::models::{RawTransaction, FEATURE_COUNT};

#[allow(dead_code)]
pub const SUBJECT: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
#[allow(dead_code)]
pub const PEER_A: &str = "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae";
#[allow(dead_code)]
pub const PEER_B: &str = "0x8617e340b3d01fa5f11f306f4090fd50e238070d";

#[allow(dead_code)]
pub const ONE_ETHER: &str = "1000000000000000000";

/// Ledger source answering every address with the same outcome.
pub enum StubLedger {
    History(Vec<RawTransaction>),
    Failing(String),
}

#[async_trait]
impl LedgerSource for StubLedger {
    async fn fetch_transactions(&self, _address: &str) -> Result<Vec<RawTransaction>, LedgerError> {
        match self {
            StubLedger::History(records) => Ok(records.clone()),
            StubLedger::Failing(msg) => Err(LedgerError::Api(msg.clone())),
        }
    }
}

/// Explorer-shaped record.
#[allow(dead_code)]
pub fn raw_tx(from: &str, to: &str, wei: &str, timestamp: i64) -> RawTransaction {
    RawTransaction {
        hash: Some(format!("0x{timestamp:064x}")),
        from: Some(from.into()),
        to: Some(to.into()),
        value: Some(wei.into()),
        time_stamp: Some(timestamp.to_string()),
        input: Some("0x".into()),
    }
}

pub struct Identity;

impl FeatureTransform for Identity {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        Ok(features.to_vec())
    }
}

/// Classifier with a fixed answer that records how it was used.
pub struct ScriptedClassifier {
    pub prediction: Prediction,
    pub attribution: Option<Vec<f64>>,
    pub predict_calls: AtomicUsize,
    pub attribute_calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedClassifier {
    pub fn new(class: u8, p1: f64) -> Self {
        Self {
            prediction: Prediction {
                class,
                probabilities: [1.0 - p1, p1],
            },
            attribution: Some((0..FEATURE_COUNT).map(|i| (i as f64 - 10.0) / 10.0).collect()),
            predict_calls: AtomicUsize::new(0),
            attribute_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_attribution(mut self) -> Self {
        self.attribution = None;
        self
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn attribute_calls(&self) -> usize {
        self.attribute_calls.load(Ordering::SeqCst)
    }
}

impl Classifier for ScriptedClassifier {
    fn predict(&self, _features: &[f64]) -> Result<Prediction, ModelError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.prediction)
    }

    fn attribute(&self, _features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.attribution
            .clone()
            .ok_or(ModelError::AttributionUnsupported)
    }
}

#[allow(dead_code)]
pub fn analyzer_with(ledger: StubLedger, classifier: Arc<ScriptedClassifier>) -> Analyzer {
    let artifacts = ModelArtifacts::new(Arc::new(Identity), classifier);
    Analyzer::new(Arc::new(ledger), ScoringEngine::new(artifacts))
}

#[allow(dead_code)]
pub fn analyzer_without_model(ledger: StubLedger) -> Analyzer {
    Analyzer::new(
        Arc::new(ledger),
        ScoringEngine::unavailable("model artifacts unavailable: scam_model.json not found"),
    )
}

#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
