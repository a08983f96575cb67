use std::env;
use std::path::PathBuf;

use crate::ledger::etherscan::ETHERSCAN_API_BASE;

const DEFAULT_NORMALIZER_PATH: &str = "artifacts/scam_normalizer.json";
const DEFAULT_MODEL_PATH: &str = "artifacts/scam_model.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Block explorer
    pub etherscan_api_key: String,
    pub etherscan_base_url: String,
    pub fetch_timeout_secs: u64,

    // Trained artifacts
    pub normalizer_path: PathBuf,
    pub model_path: PathBuf,

    /// Bearer token required on `/api/*` when set.
    pub api_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".into())
                .parse()?,

            etherscan_api_key: env::var("ETHERSCAN_API_KEY")
                .map_err(|_| anyhow::anyhow!("ETHERSCAN_API_KEY must be set"))?,
            etherscan_base_url: env::var("ETHERSCAN_BASE_URL")
                .unwrap_or_else(|_| ETHERSCAN_API_BASE.into()),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),

            normalizer_path: env::var("NORMALIZER_PATH")
                .unwrap_or_else(|_| DEFAULT_NORMALIZER_PATH.into())
                .into(),
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.into())
                .into(),

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
        })
    }

    /// Settings for tests and local runs without an environment.
    pub fn local(etherscan_api_key: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            etherscan_api_key: etherscan_api_key.into(),
            etherscan_base_url: ETHERSCAN_API_BASE.into(),
            fetch_timeout_secs: 30,
            normalizer_path: DEFAULT_NORMALIZER_PATH.into(),
            model_path: DEFAULT_MODEL_PATH.into(),
            api_token: None,
        }
    }
}
