use std::sync::Arc;
use std::time::Duration;

use walletscan::api::router::create_router;
use walletscan::config::AppConfig;
use walletscan::inference::ModelArtifacts;
use walletscan::ingestion::Analyzer;
use walletscan::intelligence::ScoringEngine;
use walletscan::ledger::EtherscanClient;
use walletscan::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = walletscan::metrics::init_metrics()?;

    // --- Trained artifacts: loaded once, shared read-only ---
    tracing::info!(
        normalizer = %config.normalizer_path.display(),
        model = %config.model_path.display(),
        "Loading model artifacts..."
    );
    let engine = ScoringEngine::from_load(ModelArtifacts::load(
        &config.normalizer_path,
        &config.model_path,
    ));

    // --- Ledger source ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()?;
    let source = EtherscanClient::new(http, config.etherscan_api_key.clone())
        .with_base_url(config.etherscan_base_url.clone());

    let analyzer = Analyzer::new(Arc::new(source), engine);

    let state = AppState {
        config,
        analyzer: Arc::new(analyzer),
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
