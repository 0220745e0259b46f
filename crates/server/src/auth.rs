//! Authentication Middleware
//!
//! Optional API key check via `Authorization: Bearer <key>`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;

use trade_query_config::Settings;

use crate::ServerError;

static AUTH_DISABLED_WARNED: AtomicBool = AtomicBool::new(false);

/// What the middleware should do with a request
#[derive(Debug, PartialEq, Eq)]
enum AuthCheck {
    Disabled,
    PublicPath,
    ConfigError(&'static str),
    CheckKey(String),
}

/// Read everything needed from the settings without holding the lock
/// across an await point.
fn check_auth_config(config: &RwLock<Settings>, path: &str) -> AuthCheck {
    let guard = config.read();
    let auth = &guard.server.auth;

    if !auth.enabled {
        if !AUTH_DISABLED_WARNED.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                "API authentication is disabled. Set TRADE_QUERY__SERVER__AUTH__ENABLED=true for production."
            );
        }
        return AuthCheck::Disabled;
    }

    if auth.public_paths.iter().any(|p| path.starts_with(p.as_str())) {
        return AuthCheck::PublicPath;
    }

    match &auth.api_key {
        Some(key) if !key.is_empty() => AuthCheck::CheckKey(key.clone()),
        _ => AuthCheck::ConfigError("Auth is enabled but no API key is configured"),
    }
}

/// Rejects requests without a valid bearer key when auth is enabled.
/// Public paths (health, readiness, metrics by default) always pass.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let config = match request.extensions().get::<Arc<RwLock<Settings>>>() {
        Some(cfg) => cfg.clone(),
        None => {
            tracing::error!("Settings extension not found in request");
            return ServerError::Internal("server configuration error".to_string())
                .into_response();
        }
    };

    let check = check_auth_config(&config, request.uri().path());

    match check {
        AuthCheck::Disabled | AuthCheck::PublicPath => next.run(request).await,
        AuthCheck::ConfigError(msg) => {
            tracing::error!("{}", msg);
            ServerError::Internal("server authentication not configured".to_string())
                .into_response()
        }
        AuthCheck::CheckKey(expected) => {
            let provided = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match provided {
                Some(value) => match value.strip_prefix("Bearer ") {
                    Some(key) if constant_time_compare(key.as_bytes(), expected.as_bytes()) => {
                        next.run(request).await
                    }
                    Some(_) => {
                        tracing::warn!(
                            forwarded_for = ?request.headers().get("X-Forwarded-For"),
                            "Invalid API key"
                        );
                        ServerError::Auth("invalid API key".to_string()).into_response()
                    }
                    None => (
                        StatusCode::BAD_REQUEST,
                        "Invalid Authorization header format. Expected: Bearer <token>",
                    )
                        .into_response(),
                },
                None => ServerError::Auth("missing Authorization header".to_string())
                    .into_response(),
            }
        }
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool, key: Option<&str>) -> RwLock<Settings> {
        let mut settings = Settings::default();
        settings.server.auth.enabled = enabled;
        settings.server.auth.api_key = key.map(str::to_string);
        RwLock::new(settings)
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"secret", b"secret"));
        assert!(!constant_time_compare(b"secret", b"secre"));
        assert!(!constant_time_compare(b"secret", b"secreT"));
    }

    #[test]
    fn test_check_auth_config() {
        assert_eq!(
            check_auth_config(&settings(false, None), "/api/interpret"),
            AuthCheck::Disabled
        );
        assert_eq!(
            check_auth_config(&settings(true, Some("k")), "/health"),
            AuthCheck::PublicPath
        );
        assert_eq!(
            check_auth_config(&settings(true, Some("k")), "/api/interpret"),
            AuthCheck::CheckKey("k".to_string())
        );
        assert!(matches!(
            check_auth_config(&settings(true, Some("")), "/api/interpret"),
            AuthCheck::ConfigError(_)
        ));
    }
}
