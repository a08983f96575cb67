mod common;

use std::sync::Arc;

use walletscan::inference::{ArtifactError, ModelArtifacts};
use walletscan::ingestion::Analyzer;
use walletscan::intelligence::ScoringEngine;
use walletscan::models::{Feature, RawTransaction, Verdict};

use common::{
    analyzer_with, analyzer_without_model, fixture, raw_tx, ScriptedClassifier, StubLedger,
    ONE_ETHER, PEER_A, PEER_B, SUBJECT,
};

const FIVE_ETHER: &str = "5000000000000000000";
const TENTH_ETHER: &str = "100000000000000000";

/// Six 5 ETH sends followed by fourteen 0.1 ETH receipts, one minute apart.
fn draining_history() -> Vec<RawTransaction> {
    let mut history = Vec::new();
    for i in 0..6 {
        history.push(raw_tx(SUBJECT, PEER_A, FIVE_ETHER, 1_700_000_000 + i * 60));
    }
    for i in 6..20 {
        history.push(raw_tx(PEER_B, SUBJECT, TENTH_ETHER, 1_700_000_000 + i * 60));
    }
    history
}

fn fixture_analyzer(history: Vec<RawTransaction>) -> Analyzer {
    let artifacts = ModelArtifacts::load(
        &fixture("scam_normalizer.json"),
        &fixture("scam_model.json"),
    )
    .expect("fixture artifacts should load");
    Analyzer::new(Arc::new(StubLedger::History(history)), ScoringEngine::new(artifacts))
}

#[tokio::test]
async fn test_empty_history_short_circuits() {
    let classifier = Arc::new(ScriptedClassifier::new(1, 0.99));
    let analyzer = analyzer_with(StubLedger::History(vec![]), classifier.clone());

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.verdict, Verdict::NotFlagged);
    assert_eq!(report.confidence, 0.0);
    assert!(report.explanations.is_empty());
    assert_eq!(report.transaction_count, 0);
    assert!(report.features.is_all_zero());
    assert!(report.error.is_none());
    assert_eq!(classifier.predict_calls(), 0);
}

#[tokio::test]
async fn test_single_send_features() {
    let classifier = Arc::new(ScriptedClassifier::new(0, 0.1));
    let history = vec![raw_tx(SUBJECT, PEER_A, ONE_ETHER, 1_700_000_000)];
    let analyzer = analyzer_with(StubLedger::History(history), classifier.clone());

    let report = analyzer.analyze(SUBJECT).await;
    let f = &report.features;

    assert_eq!(f.get(Feature::SentCount), 1.0);
    assert_eq!(f.get(Feature::ReceivedCount), 0.0);
    assert_eq!(f.get(Feature::UniqueReceiversFromMe), 1.0);
    assert_eq!(f.get(Feature::MinValueSent), 1.0);
    assert_eq!(f.get(Feature::MaxValueSent), 1.0);
    assert_eq!(f.get(Feature::AvgValueSent), 1.0);
    assert_eq!(f.get(Feature::TotalValueSent), 1.0);
    assert_eq!(f.get(Feature::NetBalance), -1.0);
    assert_eq!(f.get(Feature::TotalTransactionCount), 1.0);
    assert_eq!(f.get(Feature::TimeSpanMinutes), 0.0);
    assert_eq!(f.get(Feature::AvgMinutesBetweenSent), 0.0);

    assert_eq!(report.verdict, Verdict::NotFlagged);
    assert!((report.confidence - 0.9).abs() < 1e-12);
    assert!(report.explanations.is_empty());
    assert_eq!(classifier.predict_calls(), 1);
    assert_eq!(classifier.attribute_calls(), 0);
}

#[tokio::test]
async fn test_record_order_does_not_matter() {
    let sorted = vec![
        raw_tx(PEER_A, SUBJECT, ONE_ETHER, 1_700_000_000),
        raw_tx(SUBJECT, PEER_B, TENTH_ETHER, 1_700_000_600),
        raw_tx(PEER_B, SUBJECT, FIVE_ETHER, 1_700_003_600),
        raw_tx(SUBJECT, PEER_A, ONE_ETHER, 1_700_007_200),
    ];
    let mut shuffled = sorted.clone();
    shuffled.swap(0, 3);
    shuffled.swap(1, 2);

    let classifier = Arc::new(ScriptedClassifier::new(0, 0.2));
    let a = analyzer_with(StubLedger::History(sorted), classifier.clone())
        .analyze(SUBJECT)
        .await;
    let b = analyzer_with(StubLedger::History(shuffled), classifier)
        .analyze(SUBJECT)
        .await;

    assert_eq!(a.features, b.features);
    assert_eq!(a.features.get(Feature::TimeSpanMinutes), 120.0);
    assert_eq!(a.features.get(Feature::AvgMinutesBetweenReceived), 60.0);
}

#[tokio::test]
async fn test_missing_artifacts_report_error() {
    let history = vec![raw_tx(SUBJECT, PEER_A, ONE_ETHER, 1_700_000_000)];
    let analyzer = analyzer_without_model(StubLedger::History(history));

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.verdict, Verdict::Error);
    assert_eq!(report.confidence, 0.0);
    assert!(report.explanations.is_empty());
    assert_eq!(report.transaction_count, 1);
    assert!(report.error.as_deref().unwrap_or_default().contains("unavailable"));
}

#[tokio::test]
async fn test_missing_artifacts_still_short_circuit_empty_history() {
    let analyzer = analyzer_without_model(StubLedger::History(vec![]));

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.verdict, Verdict::NotFlagged);
    assert_eq!(report.confidence, 0.0);
}

#[tokio::test]
async fn test_flagged_address_is_explained() {
    let classifier = Arc::new(ScriptedClassifier::new(1, 0.82));
    let analyzer = analyzer_with(StubLedger::History(draining_history()), classifier.clone());

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.verdict, Verdict::Flagged);
    assert!((report.confidence - 0.82).abs() < 1e-12);
    assert_eq!(report.explanations.len(), 3);
    assert!(report
        .explanations
        .windows(2)
        .all(|w| w[0].value.abs() >= w[1].value.abs()));
    assert_eq!(report.explanations[0].feature, Feature::AvgMinutesBetweenSent);
    assert_eq!(report.explanations[1].feature, Feature::NetBalance);
    assert_eq!(classifier.attribute_calls(), 1);
}

#[tokio::test]
async fn test_flagged_without_attribution_keeps_verdict() {
    let classifier = Arc::new(ScriptedClassifier::new(1, 0.7).without_attribution());
    let analyzer = analyzer_with(StubLedger::History(draining_history()), classifier.clone());

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.verdict, Verdict::Flagged);
    assert!((report.confidence - 0.7).abs() < 1e-12);
    assert!(report.explanations.is_empty());
    assert!(report.error.is_none());
    assert_eq!(classifier.attribute_calls(), 1);
}

#[tokio::test]
async fn test_fetch_failure_reports_error() {
    let classifier = Arc::new(ScriptedClassifier::new(1, 0.9));
    let analyzer = analyzer_with(
        StubLedger::Failing("NOTOK: Invalid API Key".into()),
        classifier.clone(),
    );

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.verdict, Verdict::Error);
    assert_eq!(report.confidence, 0.0);
    assert!(report.explanations.is_empty());
    assert!(report.error.as_deref().unwrap_or_default().contains("Invalid API Key"));
    assert_eq!(classifier.predict_calls(), 0);
}

#[tokio::test]
async fn test_malformed_records_are_excluded() {
    let mut bad_value = raw_tx(SUBJECT, PEER_A, ONE_ETHER, 1_700_000_060);
    bad_value.value = Some("lots".into());
    let mut no_sender = raw_tx(PEER_B, SUBJECT, ONE_ETHER, 1_700_000_120);
    no_sender.from = None;
    let mut bad_time = raw_tx(PEER_B, SUBJECT, ONE_ETHER, 1_700_000_180);
    bad_time.time_stamp = Some("yesterday".into());

    let history = vec![
        raw_tx(PEER_A, SUBJECT, ONE_ETHER, 1_700_000_000),
        bad_value,
        no_sender,
        bad_time,
    ];
    let classifier = Arc::new(ScriptedClassifier::new(0, 0.3));
    let analyzer = analyzer_with(StubLedger::History(history), classifier);

    let report = analyzer.analyze(SUBJECT).await;

    assert_eq!(report.transaction_count, 1);
    assert_eq!(report.features.get(Feature::ReceivedCount), 1.0);
    assert_eq!(report.features.get(Feature::SentCount), 0.0);
    assert_eq!(report.verdict, Verdict::NotFlagged);
}

#[tokio::test]
async fn test_fixture_model_flags_draining_wallet() {
    let report = fixture_analyzer(draining_history()).analyze(SUBJECT).await;

    // margin 2.5 + 1.0
    let expected = 1.0 / (1.0 + (-3.5f64).exp());
    assert_eq!(report.verdict, Verdict::Flagged);
    assert!((report.confidence - expected).abs() < 1e-9);
    assert_eq!(report.transaction_count, 20);

    let mut named: Vec<Feature> = report.explanations.iter().map(|c| c.feature).collect();
    named.sort_by_key(|f| f.index());
    assert_eq!(
        named,
        vec![Feature::SentCount, Feature::TotalTransactionCount, Feature::NetBalance]
    );
    assert!(report.explanations.iter().all(|c| c.value > 0.0));

    // Attributions add up to the margin minus the expected margin (-0.35 + 0.1).
    let total: f64 = report.explanations.iter().map(|c| c.value).sum();
    assert!((total - 3.75).abs() < 1e-9);
}

#[tokio::test]
async fn test_fixture_model_clears_quiet_wallet() {
    let history = vec![
        raw_tx(PEER_A, SUBJECT, ONE_ETHER, 1_700_000_000),
        raw_tx(PEER_B, SUBJECT, ONE_ETHER, 1_700_086_400),
    ];
    let report = fixture_analyzer(history).analyze(SUBJECT).await;

    // margin -1.0 - 0.5
    let p_flagged = 1.0 / (1.0 + 1.5f64.exp());
    assert_eq!(report.verdict, Verdict::NotFlagged);
    assert!((report.confidence - (1.0 - p_flagged)).abs() < 1e-9);
    assert!(report.explanations.is_empty());
}

#[test]
fn test_reordered_model_is_rejected() {
    let result = ModelArtifacts::load(
        &fixture("scam_normalizer.json"),
        &fixture("reordered_model.json"),
    );
    assert!(matches!(
        result,
        Err(ArtifactError::Schema { artifact: "classifier", .. })
    ));
}

#[test]
fn test_missing_artifact_file_is_io_error() {
    let result = ModelArtifacts::load(
        &fixture("scam_normalizer.json"),
        &fixture("no_such_model.json"),
    );
    assert!(matches!(result, Err(ArtifactError::Io { .. })));

    let engine = ScoringEngine::from_load(result);
    assert!(!engine.is_ready());
}
