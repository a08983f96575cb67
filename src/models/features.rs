use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Number of features in the schema.
/// Must match `Feature::ALL.len()`.
pub const FEATURE_COUNT: usize = 21;

/// The feature schema, in the exact order the classifier was trained on.
///
/// Reordering variants changes the model input layout and invalidates every
/// trained artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    AvgMinutesBetweenSent,
    AvgMinutesBetweenReceived,
    TimeSpanMinutes,
    SentCount,
    ReceivedCount,
    ContractsCreated,
    UniqueSendersToMe,
    UniqueReceiversFromMe,
    MinValueReceived,
    MaxValueReceived,
    AvgValueReceived,
    MinValueSent,
    MaxValueSent,
    AvgValueSent,
    MinValueSentToContract,
    MaxValueSentToContract,
    AvgValueSentToContract,
    TotalTransactionCount,
    TotalValueSent,
    TotalValueReceived,
    NetBalance,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::AvgMinutesBetweenSent,
        Feature::AvgMinutesBetweenReceived,
        Feature::TimeSpanMinutes,
        Feature::SentCount,
        Feature::ReceivedCount,
        Feature::ContractsCreated,
        Feature::UniqueSendersToMe,
        Feature::UniqueReceiversFromMe,
        Feature::MinValueReceived,
        Feature::MaxValueReceived,
        Feature::AvgValueReceived,
        Feature::MinValueSent,
        Feature::MaxValueSent,
        Feature::AvgValueSent,
        Feature::MinValueSentToContract,
        Feature::MaxValueSentToContract,
        Feature::AvgValueSentToContract,
        Feature::TotalTransactionCount,
        Feature::TotalValueSent,
        Feature::TotalValueReceived,
        Feature::NetBalance,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::AvgMinutesBetweenSent => "avg_minutes_between_sent",
            Feature::AvgMinutesBetweenReceived => "avg_minutes_between_received",
            Feature::TimeSpanMinutes => "time_span_minutes",
            Feature::SentCount => "sent_count",
            Feature::ReceivedCount => "received_count",
            Feature::ContractsCreated => "contracts_created",
            Feature::UniqueSendersToMe => "unique_senders_to_me",
            Feature::UniqueReceiversFromMe => "unique_receivers_from_me",
            Feature::MinValueReceived => "min_value_received",
            Feature::MaxValueReceived => "max_value_received",
            Feature::AvgValueReceived => "avg_value_received",
            Feature::MinValueSent => "min_value_sent",
            Feature::MaxValueSent => "max_value_sent",
            Feature::AvgValueSent => "avg_value_sent",
            Feature::MinValueSentToContract => "min_value_sent_to_contract",
            Feature::MaxValueSentToContract => "max_value_sent_to_contract",
            Feature::AvgValueSentToContract => "avg_value_sent_to_contract",
            Feature::TotalTransactionCount => "total_transaction_count",
            Feature::TotalValueSent => "total_value_sent",
            Feature::TotalValueReceived => "total_value_received",
            Feature::NetBalance => "net_balance",
        }
    }

    /// Column label in the training dataset. Artifacts exported straight
    /// from the training frame carry these instead of the snake_case names.
    pub fn column_label(&self) -> &'static str {
        match self {
            Feature::AvgMinutesBetweenSent => "Avg min between sent tnx",
            Feature::AvgMinutesBetweenReceived => "Avg min between received tnx",
            Feature::TimeSpanMinutes => "Time Diff between first and last (Mins)",
            Feature::SentCount => "Sent tnx",
            Feature::ReceivedCount => "Received Tnx",
            Feature::ContractsCreated => "Number of Created Contracts",
            Feature::UniqueSendersToMe => "Unique Received From Addresses",
            Feature::UniqueReceiversFromMe => "Unique Sent To Addresses",
            Feature::MinValueReceived => "min value received",
            Feature::MaxValueReceived => "max value received ",
            Feature::AvgValueReceived => "avg val received",
            Feature::MinValueSent => "min val sent",
            Feature::MaxValueSent => "max val sent",
            Feature::AvgValueSent => "avg val sent",
            Feature::MinValueSentToContract => "min value sent to contract",
            Feature::MaxValueSentToContract => "max val sent to contract",
            Feature::AvgValueSentToContract => "avg value sent to contract",
            Feature::TotalTransactionCount => "total transactions (including tnx to create contract",
            Feature::TotalValueSent => "total Ether sent",
            Feature::TotalValueReceived => "total ether received",
            Feature::NetBalance => "total ether balance",
        }
    }

    /// True if `name` identifies this feature under either naming.
    pub fn matches(&self, name: &str) -> bool {
        name == self.as_str() || name == self.column_label()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FeatureRecord
// ---------------------------------------------------------------------------

/// Fixed-width feature vector. Every record carries all `FEATURE_COUNT`
/// fields, in schema order, whatever the size of the history behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRecord {
    values: [f64; FEATURE_COUNT],
}

impl FeatureRecord {
    /// The record of an account with no history.
    pub fn zeros() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self::zeros()
    }
}

/// Serialized as an ordered `{name: value}` object.
impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.as_str(), &value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
