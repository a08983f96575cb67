pub mod api;
pub mod config;
pub mod errors;
pub mod inference;
pub mod ingestion;
pub mod intelligence;
pub mod ledger;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ingestion::Analyzer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Arc<Analyzer>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
