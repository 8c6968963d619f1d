use crate::errors::AppError;
use crate::handlers::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Hex-encoded SHA-256 digest of a bearer token, as stored in `ACCESS_TOKEN_SHA256`.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Requires `Authorization: Bearer <token>` matching one of the configured
/// token digests. Passes everything through when no digest is configured.
pub async fn require_access_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let accepted = &state.config.access_token_digests;
    if accepted.is_empty() {
        return Ok(next.run(request).await);
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let presented = token_digest(token);
    // Check every digest so timing does not reveal which one matched
    let matched = accepted
        .iter()
        .fold(false, |found, expected| constant_time_compare(&presented, expected) | found);

    if !matched {
        tracing::warn!("Invalid bearer token received");
        return Err(AppError::Unauthorized("Invalid bearer token".to_string()));
    }

    Ok(next.run(request).await)
}

/// Constant-time string comparison (basic implementation)
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_digest_is_sha256_hex() {
        assert_eq!(
            token_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abcd", "abcd"));
        assert!(!constant_time_compare("abcd", "abce"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
