//! Per-request credential resolution
//!
//! Resolves the caller's identity from either the credential cookies or the
//! programmatic key headers. Every failure on this path (missing tokens,
//! malformed hex, failed decryption, unknown prefix, digest mismatch)
//! collapses into one uniform 401 so the response never reveals which step
//! rejected the credential.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::api::cookies;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{KeyPrefix, OwnerId};

/// Extractor that requires an authenticated caller
///
/// Accepts the credential from either:
/// - the two credential cookies written at issuance, or
/// - `Authorization: Bearer <hex key>` / `X-API-Key: <hex key>` headers
#[derive(Debug, Clone)]
pub struct RequireOwner {
    pub owner_id: OwnerId,
    /// Prefix of the key authenticating this request
    pub prefix: KeyPrefix,
}

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let resolved = if let Some(tokens) = cookies::load(&jar) {
            state
                .api_key_service
                .authenticate_transport(&tokens.initialization_vector, &tokens.ciphertext)
                .await
        } else if let Some(key_hex) = extract_api_key_from_headers(&parts.headers) {
            state.api_key_service.authenticate_header(&key_hex).await
        } else {
            return Err(unauthenticated());
        };

        match resolved {
            Ok(key) => Ok(RequireOwner {
                owner_id: key.owner_id,
                prefix: key.prefix,
            }),
            Err(e) => {
                // Detail stays server-side; the client sees one outcome.
                debug!(error = %e, "credential resolution failed");
                Err(unauthenticated())
            }
        }
    }
}

fn unauthenticated() -> ApiError {
    ApiError::unauthorized("not authenticated")
}

/// Extract the raw hex key from the programmatic headers, if present.
///
/// The Authorization bearer token takes precedence over X-API-Key.
fn extract_api_key_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    if let Some(api_key_header) = headers.get("x-api-key") {
        if let Ok(key) = api_key_header.to_str() {
            return Some(key.trim().to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer deadbeefdeadbeef".parse().unwrap(),
        );

        assert_eq!(
            extract_api_key_from_headers(&headers),
            Some("deadbeefdeadbeef".to_string())
        );
    }

    #[test]
    fn test_extract_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "deadbeefdeadbeef".parse().unwrap());

        assert_eq!(
            extract_api_key_from_headers(&headers),
            Some("deadbeefdeadbeef".to_string())
        );
    }

    #[test]
    fn test_bearer_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer from-bearer".parse().unwrap());
        headers.insert("x-api-key", "from-x-api-key".parse().unwrap());

        assert_eq!(
            extract_api_key_from_headers(&headers),
            Some("from-bearer".to_string())
        );
    }

    #[test]
    fn test_missing_headers() {
        let headers = HeaderMap::new();
        assert_eq!(extract_api_key_from_headers(&headers), None);
    }

    #[test]
    fn test_non_bearer_authorization_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        assert_eq!(extract_api_key_from_headers(&headers), None);
    }

    #[test]
    fn test_token_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   deadbeef   ".parse().unwrap(),
        );

        assert_eq!(
            extract_api_key_from_headers(&headers),
            Some("deadbeef".to_string())
        );
    }
}
