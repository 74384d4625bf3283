//! Admin API guard.
//!
//! Admin routes need the configured pre-shared key, sent either as
//! `x-api-key` or as a bearer token. Keys are compared in constant time.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header carrying the admin key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware for the admin router. Without a configured key the admin API
/// is closed.
pub async fn admin_psk_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_psk else {
        return AppError::Forbidden("Admin API is disabled".to_string()).into_response();
    };

    match presented_key(request.headers()) {
        Some(key) if keys_match(key, &expected) => next.run(request).await,
        Some(_) => AppError::unauthorized("Invalid API key").into_response(),
        None => AppError::unauthorized("Missing API key").into_response(),
    }
}

/// `x-api-key` wins over `Authorization: Bearer`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let header_str = |name| headers.get(name).and_then(|v| v.to_str().ok());

    header_str(header::HeaderName::from_static(API_KEY_HEADER)).or_else(|| {
        header_str(header::AUTHORIZATION).and_then(|value| value.strip_prefix("Bearer "))
    })
}

fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
