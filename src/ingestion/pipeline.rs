use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};

use super::records::parse_records;
use crate::intelligence::{aggregate, ScoringEngine};
use crate::ledger::LedgerSource;
use crate::models::{AnalysisReport, Transaction, Verdict};

/// Full analysis of one address:
/// 1. Fetch history from the ledger source
/// 2. Drop malformed records
/// 3. Aggregate features
/// 4. Score
/// 5. Explain, for flagged addresses only
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn LedgerSource>,
    engine: ScoringEngine,
}

impl Analyzer {
    pub fn new(source: Arc<dyn LedgerSource>, engine: ScoringEngine) -> Self {
        Self { source, engine }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub async fn analyze(&self, address: &str) -> AnalysisReport {
        let start = Instant::now();
        counter!("analyses_total").increment(1);

        let report = match self.source.fetch_transactions(address).await {
            Ok(raw) => {
                let transactions = parse_records(address, raw);
                self.analyze_transactions(address, &transactions)
            }
            Err(e) => {
                counter!("ledger_fetch_failures_total").increment(1);
                tracing::error!(address = %address, error = %e, "Transaction fetch failed");
                AnalysisReport::failed(address, format!("failed to fetch transactions: {e}"))
            }
        };

        counter!("verdicts_total", "verdict" => report.verdict.as_str()).increment(1);
        histogram!("analysis_latency_seconds").record(start.elapsed().as_secs_f64());

        report
    }

    /// Score an already-fetched history. Pure apart from logging.
    pub fn analyze_transactions(&self, address: &str, transactions: &[Transaction]) -> AnalysisReport {
        let features = aggregate(transactions, address);
        let score = self.engine.score(&features);
        let explanations = self.engine.explain(&score);

        tracing::info!(
            address = %address,
            transactions = transactions.len(),
            verdict = %score.verdict,
            confidence = score.confidence,
            explained = explanations.len(),
            "Address analyzed"
        );

        let transaction_count = transactions.len();
        if score.verdict == Verdict::Error {
            return AnalysisReport {
                transaction_count,
                features,
                ..AnalysisReport::failed(address, score.error.unwrap_or_default())
            };
        }

        AnalysisReport {
            address: address.to_string(),
            verdict: score.verdict,
            confidence: score.confidence,
            explanations,
            transaction_count,
            features,
            analyzed_at: Utc::now(),
            error: None,
        }
    }
}
