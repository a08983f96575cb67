use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Feature, FeatureRecord, Transaction};

/// Build the feature record of `subject` from its transaction history.
///
/// An empty history yields the all-zero record; that is the defined state of
/// an unused account, not an error. Input order does not matter: the history
/// is put in timestamp order before any time-series feature is computed.
pub fn aggregate(transactions: &[Transaction], subject: &str) -> FeatureRecord {
    if transactions.is_empty() {
        return FeatureRecord::zeros();
    }

    let subject = subject.trim().to_lowercase();

    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| t.timestamp);

    let sent: Vec<&Transaction> = ordered
        .iter()
        .copied()
        .filter(|t| t.from == subject)
        .collect();
    let received: Vec<&Transaction> = ordered
        .iter()
        .copied()
        .filter(|t| t.to.as_deref() == Some(subject.as_str()))
        .collect();
    let sent_to_contracts: Vec<&Transaction> =
        sent.iter().copied().filter(|t| t.has_payload()).collect();

    let received_stats = ValueStats::of(&received);
    let sent_stats = ValueStats::of(&sent);
    let contract_stats = ValueStats::of(&sent_to_contracts);

    let unique_senders: HashSet<&str> = received.iter().map(|t| t.from.as_str()).collect();
    let unique_receivers: HashSet<&str> = sent.iter().filter_map(|t| t.to.as_deref()).collect();

    let mut record = FeatureRecord::zeros();
    record.set(Feature::AvgMinutesBetweenSent, mean_gap_minutes(&sent));
    record.set(Feature::AvgMinutesBetweenReceived, mean_gap_minutes(&received));
    record.set(Feature::TimeSpanMinutes, span_minutes(&ordered));
    record.set(Feature::SentCount, sent.len() as f64);
    record.set(Feature::ReceivedCount, received.len() as f64);
    record.set(
        Feature::ContractsCreated,
        sent.iter().filter(|t| t.is_contract_creation()).count() as f64,
    );
    record.set(Feature::UniqueSendersToMe, unique_senders.len() as f64);
    record.set(Feature::UniqueReceiversFromMe, unique_receivers.len() as f64);

    record.set(Feature::MinValueReceived, to_f64(received_stats.min));
    record.set(Feature::MaxValueReceived, to_f64(received_stats.max));
    record.set(Feature::AvgValueReceived, to_f64(received_stats.avg));

    record.set(Feature::MinValueSent, to_f64(sent_stats.min));
    record.set(Feature::MaxValueSent, to_f64(sent_stats.max));
    record.set(Feature::AvgValueSent, to_f64(sent_stats.avg));

    record.set(Feature::MinValueSentToContract, to_f64(contract_stats.min));
    record.set(Feature::MaxValueSentToContract, to_f64(contract_stats.max));
    record.set(Feature::AvgValueSentToContract, to_f64(contract_stats.avg));

    record.set(Feature::TotalTransactionCount, ordered.len() as f64);
    record.set(Feature::TotalValueSent, to_f64(sent_stats.total));
    record.set(Feature::TotalValueReceived, to_f64(received_stats.total));
    record.set(
        Feature::NetBalance,
        to_f64(received_stats.total - sent_stats.total),
    );

    tracing::debug!(
        subject = %subject,
        total = ordered.len(),
        sent = sent.len(),
        received = received.len(),
        "Features aggregated"
    );

    record
}

/// Min / max / mean / sum of ether values, all zero for an empty set.
/// Kept in `Decimal` until the end so the result doesn't depend on order.
struct ValueStats {
    min: Decimal,
    max: Decimal,
    avg: Decimal,
    total: Decimal,
}

impl ValueStats {
    fn of(txs: &[&Transaction]) -> Self {
        if txs.is_empty() {
            return Self {
                min: Decimal::ZERO,
                max: Decimal::ZERO,
                avg: Decimal::ZERO,
                total: Decimal::ZERO,
            };
        }

        let total = txs.iter().map(|t| t.value).sum::<Decimal>();
        Self {
            min: txs.iter().map(|t| t.value).min().unwrap_or_default(),
            max: txs.iter().map(|t| t.value).max().unwrap_or_default(),
            avg: total / Decimal::from(txs.len() as i64),
            total,
        }
    }
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}

/// Mean gap between consecutive (time-ordered) transactions, in minutes.
/// Zero with fewer than two transactions.
fn mean_gap_minutes(ordered: &[&Transaction]) -> f64 {
    if ordered.len() < 2 {
        return 0.0;
    }
    let gaps: i64 = ordered
        .windows(2)
        .map(|w| w[1].timestamp - w[0].timestamp)
        .sum();
    gaps as f64 / (ordered.len() - 1) as f64 / 60.0
}

fn span_minutes(ordered: &[&Transaction]) -> f64 {
    match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp) as f64 / 60.0,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
