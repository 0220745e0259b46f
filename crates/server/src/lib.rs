//! Trade Query Server
//!
//! Thin HTTP adapter over the trade query engine.

pub mod audit;
pub mod auth;
pub mod http;
pub mod metrics;
pub mod state;

pub use audit::{InMemoryInteractionLog, InteractionLog, InteractionRecord};
pub use auth::auth_middleware;
pub use http::create_router;
pub use metrics::{init_metrics, record_error, record_request};
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Auth(_) => "auth",
            ServerError::PayloadTooLarge(_) => "payload_too_large",
            ServerError::Internal(_) => "internal",
        }
    }
}

impl From<trade_query_core::Error> for ServerError {
    fn from(err: trade_query_core::Error) -> Self {
        match err {
            trade_query_core::Error::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        let status: StatusCode = self.into();
        (status, Json(body)).into_response()
    }
}
