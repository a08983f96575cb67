use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("analyses_total").absolute(0);
    counter!("malformed_records_total").absolute(0);
    counter!("explanation_failures_total").absolute(0);
    counter!("ledger_fetch_failures_total").absolute(0);
    for verdict in ["flagged", "not_flagged", "error"] {
        counter!("verdicts_total", "verdict" => verdict).absolute(0);
    }

    // Histogram is lazily created on first record; force creation.
    histogram!("analysis_latency_seconds").record(0.0);

    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally.
/// Lets tests build the router without fighting over the global recorder.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
