//! Shared-secret authentication. There are no per-user accounts: every
//! caller presents the same `X-API-Key` header, checked against a single
//! configured value.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

const API_KEY_HEADER: &str = "x-api-key";

/// Marker extractor: presence in a handler's signature means the request's
/// `X-API-Key` header matched the configured secret.
pub struct Authenticated;

#[async_trait::async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.api_key.is_empty() {
            return Err(ApiError::Internal("API_KEY is not configured".to_string()));
        }

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if constant_time_eq(provided.as_bytes(), state.config.api_key.as_bytes()) {
            Ok(Authenticated)
        } else {
            Err(ApiError::unauthorized("missing or invalid API key"))
        }
    }
}

/// Compare two byte strings in time proportional to their length, not to the
/// position of the first mismatch, so a timing side channel can't be used to
/// guess the key byte by byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_equal_strings() {
        assert!(constant_time_eq(b"secret", b"secret"));
    }

    #[test]
    fn constant_time_eq_rejects_different_lengths_and_content() {
        assert!(!constant_time_eq(b"secret", b"secre"));
        assert!(!constant_time_eq(b"secret", b"SECRET"));
    }
}
