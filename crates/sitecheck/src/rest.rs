// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API.
//!
//! `POST /api/v1/analyze` runs the full pipeline for one URL and returns
//! the report (or the fetch-failure report) as JSON. Input that does not
//! normalize to an http(s) URL is rejected with 400 before the pipeline
//! runs.

use crate::orchestrator::SiteChecker;
use crate::performance::Strategy;
use crate::validate::normalize_url;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    url: Option<String>,
    strategy: Option<Strategy>,
}

/// Build the axum Router with all REST endpoints.
pub fn router(checker: Arc<SiteChecker>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/analyze", post(handle_analyze))
        .layer(cors)
        .with_state(checker)
}

/// Start the REST API server. Runs until the listener fails.
pub async fn start(host: IpAddr, port: u16, checker: Arc<SiteChecker>) -> anyhow::Result<()> {
    let app = router(checker);
    let addr = SocketAddr::new(host, port);
    tracing::info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_analyze(State(checker): State<Arc<SiteChecker>>, body: Bytes) -> Response {
    let request: AnalyzeRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(_) => return invalid_url(),
    };

    let url = match request.url.as_deref().map(normalize_url) {
        Some(Ok(url)) => url,
        Some(Err(e)) => {
            tracing::debug!("rejected input: {e}");
            return invalid_url();
        }
        None => return invalid_url(),
    };

    let outcome = match request.strategy {
        Some(strategy) => checker.analyze_url_with(&url, strategy).await,
        None => checker.analyze_url(&url).await,
    };
    Json(outcome).into_response()
}

fn invalid_url() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": "Invalid URL" })),
    )
        .into_response()
}
