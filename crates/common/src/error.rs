use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Body text returned to clients for any failed leaderboard read.
pub const PUBLIC_ERROR_MESSAGE: &str = "Failed to fetch queens data";

#[derive(Error, Debug)]
pub enum DashboardError {
    /// The backing store read failed (connectivity, missing table, bad SQL).
    #[error("aggregation failed: {0:#}")]
    Aggregation(#[source] anyhow::Error),
    /// The static snapshot could not be read or parsed.
    #[error("fallback snapshot unavailable: {0:#}")]
    FallbackUnavailable(#[source] anyhow::Error),
}

impl DashboardError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Aggregation(_) => "aggregation",
            Self::FallbackUnavailable(_) => "fallback_unavailable",
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), error = %self, "error fetching queens data");
        let body = Json(json!({ "error": PUBLIC_ERROR_MESSAGE }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
