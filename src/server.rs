use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::dashboard::{ChartSlot, Dashboard};
use crate::html;
use crate::portraits::PortraitSource;
use crate::similarity::LookupError;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub portraits: Arc<dyn PortraitSource>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

fn lookup_status(err: &LookupError) -> StatusCode {
    match err {
        LookupError::EmptyQuery => StatusCode::BAD_REQUEST,
        LookupError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/figures", get(figures))
        .route("/api/players", get(players))
        .route("/api/similar", get(similar))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "dashboard listening");
    axum::serve(listener, router(state))
        .await
        .context("http server failed")
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = std::time::Instant::now();
    let resp = next.run(req).await;
    tracing::debug!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(html::render_page(&state.dashboard))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn figures(State(state): State<AppState>) -> Json<Vec<ChartSlot>> {
    Json(state.dashboard.slots().to_vec())
}

async fn players(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dashboard.dropdown_names().to_vec())
}

async fn similar(State(state): State<AppState>, Query(params): Query<SimilarParams>) -> Response {
    let name = params.name;
    let dashboard = state.dashboard.clone();
    let portraits = state.portraits.clone();
    // Portrait fetches use the blocking client.
    let result = tokio::task::spawn_blocking(move || {
        dashboard.similar_figure(&name, portraits.as_ref())
    })
    .await;

    match result {
        Ok(Ok(figure)) => Json(figure).into_response(),
        Ok(Err(err)) => {
            tracing::info!(error = %err, "similarity lookup failed");
            error_response(lookup_status(&err), err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "similarity task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "similarity task failed".to_string())
        }
    }
}
