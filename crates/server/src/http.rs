//! HTTP Endpoints
//!
//! REST API for the trade query engine.

use std::time::{Duration, Instant};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use trade_query_core::{InterpretRequest, InterpretResponse};

use crate::audit::InteractionRecord;
use crate::auth::auth_middleware;
use crate::metrics::{metrics_handler, record_error, record_request};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds.max(1));
    let body_limit = config.server.max_body_bytes;
    drop(config);

    Router::new()
        .route("/api/interpret", post(interpret))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .route("/admin/reload-config", post(reload_config))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(Extension(state.config.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Disabled CORS allows any origin; an empty origin list also allows any
/// origin, otherwise only the configured ones.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::error!("All configured CORS origins are invalid, allowing any origin");
        return base.allow_origin(Any);
    }

    tracing::info!(count = parsed.len(), "CORS configured");
    base.allow_origin(parsed)
}

/// POST /api/interpret
async fn interpret(
    State(state): State<AppState>,
    payload: Result<Json<InterpretRequest>, JsonRejection>,
) -> Result<Json<InterpretResponse>, ServerError> {
    let Json(request) = payload.map_err(|rejection| {
        let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::InvalidRequest(rejection.body_text())
        };
        record_error(err.kind());
        err
    })?;

    let started = Instant::now();
    let engine = state.engine();
    let response = engine.handle(&request).map_err(|e| {
        let err = ServerError::from(e);
        record_error(err.kind());
        tracing::debug!(error = %err, "Interpret request rejected");
        err
    })?;
    let latency = started.elapsed();

    record_request(response.matched_intent, response.outcome, latency);

    // message_text succeeded inside handle
    let message = request.message_text().unwrap_or_default();
    state
        .interactions
        .record(InteractionRecord::new(
            message,
            request.language.as_deref(),
            &response,
            latency.as_millis() as u64,
        ))
        .await;

    Ok(Json(response))
}

/// GET /health
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /ready: the knowledge base is loaded and non-empty
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let engine = state.engine();
    let stats = engine.knowledge().stats();
    let ready = stats.products > 0 && stats.countries > 0;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "ready": ready,
            "knowledge": stats,
        })),
    )
}

/// POST /admin/reload-config
async fn reload_config(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    state.reload_config()?;
    let stats = state.engine().knowledge().stats();
    Ok(Json(serde_json::json!({
        "status": "reloaded",
        "knowledge": stats,
    })))
}
