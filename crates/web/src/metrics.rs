use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn describe() {
    describe_gauge!(
        "queens_dashboard_build_info",
        "Build info for the queens dashboard (value is always 1)."
    );
    describe_histogram!(
        "queens_db_query_latency_ms",
        "Leaderboard query latency in milliseconds, by op and status."
    );
    describe_counter!(
        "queens_db_query_errors_total",
        "Failed leaderboard queries, by op."
    );
    describe_counter!(
        "queens_fallback_total",
        "Page loads served from the static snapshot because the live read failed."
    );
    describe_counter!(
        "tracing_error_events",
        "ERROR-level tracing events, by target."
    );
}

/// Install the global Prometheus recorder once and return a handle for `/metrics`.
///
/// Upkeep runs on each `/metrics` scrape rather than on a timer.
pub fn init_global() -> Result<PrometheusHandle> {
    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder for the dashboard")?;
    describe();

    let git_sha = std::env::var("GIT_SHA").unwrap_or_else(|_| "unknown".to_string());
    ::metrics::gauge!(
        "queens_dashboard_build_info",
        "version" => env!("CARGO_PKG_VERSION"),
        "git_sha" => git_sha,
    )
    .set(1.0);

    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}
