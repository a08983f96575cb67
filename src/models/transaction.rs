use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input payload of a plain value transfer.
pub const NO_PAYLOAD: &str = "0x";

/// Wei per ether, expressed as a decimal scale.
const WEI_SCALE: u32 = 18;

// ---------------------------------------------------------------------------
// RawTransaction: explorer record, string fields as delivered
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "timeStamp")]
    pub time_stamp: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("invalid `{field}`: {value}")]
    Invalid { field: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Transaction: validated, normalized record
// ---------------------------------------------------------------------------

/// A transaction ready for aggregation. Addresses are lowercased and the
/// value is held in ether with exact 18-digit scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub from: String,
    /// `None` when the transaction created a contract.
    pub to: Option<String>,
    pub value: Decimal,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub input: String,
}

impl Transaction {
    /// True if the transaction carried call data.
    pub fn has_payload(&self) -> bool {
        self.input != NO_PAYLOAD
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = RecordError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let from = non_empty(raw.from)
            .ok_or(RecordError::Missing("from"))?
            .to_lowercase();

        let value_raw = non_empty(raw.value).ok_or(RecordError::Missing("value"))?;
        let value = wei_to_ether(&value_raw).ok_or(RecordError::Invalid {
            field: "value",
            value: value_raw,
        })?;

        let ts_raw = non_empty(raw.time_stamp).ok_or(RecordError::Missing("timeStamp"))?;
        let timestamp = ts_raw
            .parse::<i64>()
            .map_err(|_| RecordError::Invalid {
                field: "timeStamp",
                value: ts_raw.clone(),
            })?;

        Ok(Self {
            from,
            to: non_empty(raw.to).map(|s| s.to_lowercase()),
            value,
            timestamp,
            input: non_empty(raw.input).unwrap_or_else(|| NO_PAYLOAD.into()),
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Convert an integer wei amount to ether without rounding.
/// Returns `None` for non-integers or amounts beyond 96 bits.
pub fn wei_to_ether(wei: &str) -> Option<Decimal> {
    let amount: u128 = wei.parse().ok()?;
    let amount = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(amount, WEI_SCALE).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
