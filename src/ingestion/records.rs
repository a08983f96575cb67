use metrics::counter;

use crate::models::{RawTransaction, Transaction};

/// Parse explorer records, dropping (and logging) the ones that fail.
/// A bad record never aborts the batch.
pub fn parse_records(address: &str, raw: Vec<RawTransaction>) -> Vec<Transaction> {
    let total = raw.len();
    let mut parsed = Vec::with_capacity(total);

    for record in raw {
        let hash = record.hash.clone().unwrap_or_default();
        match Transaction::try_from(record) {
            Ok(tx) => parsed.push(tx),
            Err(e) => {
                counter!("malformed_records_total").increment(1);
                tracing::warn!(
                    address = %address,
                    hash = %hash,
                    error = %e,
                    "Excluding malformed transaction record"
                );
            }
        }
    }

    if parsed.len() < total {
        tracing::info!(
            address = %address,
            kept = parsed.len(),
            dropped = total - parsed.len(),
            "Malformed records excluded from aggregation"
        );
    }

    parsed
}
