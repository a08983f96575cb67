pub mod etherscan;

pub use etherscan::EtherscanClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawTransaction;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Source of an address's transaction history.
///
/// An address with no history is `Ok(vec![])`, never an error.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn fetch_transactions(&self, address: &str) -> Result<Vec<RawTransaction>, LedgerError>;
}
