use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use super::{LedgerError, LedgerSource};
use crate::models::RawTransaction;

pub const ETHERSCAN_API_BASE: &str = "https://api.etherscan.io/api";

/// Response envelope shared by every explorer endpoint.
/// `result` is the record list on success and an error string otherwise.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: ETHERSCAN_API_BASE.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch every normal transaction of `address`, oldest first.
    pub async fn get_transactions(&self, address: &str) -> Result<Vec<RawTransaction>, LedgerError> {
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "asc"),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| LedgerError::Unexpected(format!("invalid explorer url: {e}")))?;

        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope = resp.json().await?;
        parse_envelope(envelope)
    }
}

#[async_trait]
impl LedgerSource for EtherscanClient {
    async fn fetch_transactions(&self, address: &str) -> Result<Vec<RawTransaction>, LedgerError> {
        self.get_transactions(address).await
    }
}

fn parse_envelope(envelope: Envelope) -> Result<Vec<RawTransaction>, LedgerError> {
    if envelope.status != "1" {
        if envelope.message.to_lowercase().starts_with("no transactions") {
            return Ok(Vec::new());
        }
        let detail = match envelope.result {
            Value::String(s) if !s.is_empty() => format!("{}: {s}", envelope.message),
            _ => envelope.message,
        };
        return Err(LedgerError::Api(detail));
    }

    let entries = match envelope.result {
        Value::Array(entries) => entries,
        other => {
            return Err(LedgerError::Unexpected(format!(
                "expected a list of transactions, got {other}"
            )))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<RawTransaction>(entry) {
            Ok(raw) => records.push(raw),
            Err(e) => {
                counter!("malformed_records_total").increment(1);
                tracing::warn!(error = %e, "Skipping undecodable explorer record");
            }
        }
    }
    Ok(records)
}
