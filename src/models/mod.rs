pub mod features;
pub mod report;
pub mod transaction;

pub use features::{Feature, FeatureRecord, FEATURE_COUNT};
pub use report::{AnalysisReport, Contribution, Verdict};
pub use transaction::{RawTransaction, RecordError, Transaction, NO_PAYLOAD};
