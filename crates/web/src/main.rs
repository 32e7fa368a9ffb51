mod cli;
mod fallback;
mod metrics;
mod models;
mod queries;
mod service;
mod view;

use anyhow::Result;
use askama::Template;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use common::error::DashboardError;
use common::types::DashboardData;
use metrics_exporter_prometheus::PrometheusHandle;
use models::{LeaderboardView, QueenProfile};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use view::ViewState;

pub struct AppState {
    pub db_path: PathBuf,
    pub fallback_path: PathBuf,
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// `None` when no global recorder is installed (tests).
    pub metrics: Option<PrometheusHandle>,
}

// --- Templates ---

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    state: &'static str,
}

#[derive(Template)]
#[template(path = "partials/leaderboard.html")]
struct LeaderboardTemplate {
    state: &'static str,
    view: Option<LeaderboardView>,
    message: &'static str,
}

impl LeaderboardTemplate {
    fn from_state(state: ViewState) -> Self {
        let label = state.label();
        match state {
            ViewState::Loaded(snapshot) => Self {
                state: label,
                view: Some(LeaderboardView::from_snapshot(&snapshot)),
                message: "",
            },
            ViewState::Empty => Self {
                state: label,
                view: None,
                message: "No queens have staked yet",
            },
            ViewState::Loading => Self {
                state: label,
                view: None,
                message: "Loading queens...",
            },
            ViewState::Error => Self {
                state: label,
                view: None,
                message: "No data available",
            },
        }
    }
}

#[derive(Template)]
#[template(path = "partials/queen_profile.html")]
struct QueenProfileTemplate {
    profile: QueenProfile,
}

#[derive(Template)]
#[template(path = "partials/not_found.html")]
struct NotFoundTemplate {
    message: String,
}

// --- Handlers ---

async fn index() -> impl IntoResponse {
    Html(
        DashboardTemplate {
            state: ViewState::Loading.label(),
        }
        .to_string(),
    )
}

async fn api_queens(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardData>, DashboardError> {
    let data = service::fetch_leaderboard(&state.db_path).await?;
    Ok(Json(data))
}

async fn leaderboard_partial(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let outcome = service::load_snapshot(&state.db_path, &state.fallback_path).await;
    if let Err(e) = &outcome {
        tracing::error!(kind = e.kind(), error = %e, "leaderboard unavailable");
    }
    let state = ViewState::settle(outcome);
    tracing::debug!(state = state.label(), "leaderboard settled");
    Html(LeaderboardTemplate::from_state(state).to_string())
}

async fn queen_partial(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let snapshot = match service::load_snapshot(&state.db_path, &state.fallback_path).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, queen_id = id, "queen profile unavailable");
            let page = NotFoundTemplate {
                message: "No data available".to_string(),
            };
            return (StatusCode::SERVICE_UNAVAILABLE, Html(page.to_string())).into_response();
        }
    };

    match snapshot.find(id) {
        Some(queen) => {
            let page = QueenProfileTemplate {
                profile: QueenProfile::new(queen),
            };
            Html(page.to_string()).into_response()
        }
        None => {
            let page = NotFoundTemplate {
                message: format!("Queen #{id} is not on the leaderboard"),
            };
            (StatusCode::NOT_FOUND, Html(page.to_string())).into_response()
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime,
    })
}

async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(handle) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };
    handle.run_upkeep();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}

// --- Router ---

pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/partials/leaderboard", get(leaderboard_partial))
        .route("/partials/queens/{id}", get(queen_partial))
        .route("/api/queens", get(api_queens))
        .route("/api/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .route_service("/queens_data.json", ServeFile::new(&state.fallback_path))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = common::config::Config::load()?;

    let (dispatch, _otel_guard) =
        common::observability::build_dispatch("queens-dashboard", &config.general.log_level);
    tracing::dispatcher::set_global_default(dispatch).map_err(anyhow::Error::msg)?;

    let cmd = cli::parse_args(std::env::args()).map_err(anyhow::Error::msg)?;
    if cmd == cli::Command::InitSchema {
        return cli::init_schema(&config.database.path);
    }

    let handle = metrics::init_global()?;
    let web = config.web();
    let state = Arc::new(AppState {
        db_path: PathBuf::from(&config.database.path),
        fallback_path: PathBuf::from(config.fallback().path),
        started_at: chrono::Utc::now(),
        metrics: Some(handle),
    });

    let app = create_router_with_state(state);
    let addr: SocketAddr = format!("{}:{}", web.host, web.port).parse()?;
    tracing::info!(%addr, "queens dashboard listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
