pub mod aggregator;
pub mod explainer;
pub mod scorer;

pub use aggregator::aggregate;
pub use explainer::{explain, top_contributions, TOP_K};
pub use scorer::{Score, ScoringEngine};
