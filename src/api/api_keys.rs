//! API key management endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::cookies;
use crate::api::middleware::RequireOwner;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::KeyPrefix;

/// Response for a newly issued key. The raw key hex appears here once and
/// is never retrievable again.
#[derive(Debug, Serialize)]
pub struct IssueApiKeyResponse {
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

/// One of the caller's other active keys
#[derive(Debug, Serialize)]
pub struct ApiKeySummaryResponse {
    pub prefix: String,
    pub created_at: DateTime<Utc>,
}

/// List of the caller's other active keys
#[derive(Debug, Serialize)]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeySummaryResponse>,
    pub prefix_length: usize,
}

/// Request to revoke a key by its hex prefix
#[derive(Debug, Deserialize)]
pub struct RevokeApiKeyRequest {
    #[serde(default)]
    pub prefix: Option<String>,
}

/// POST /api-keys
///
/// Issues a new key for the authenticated caller and rotates the client's
/// credential cookies to the new key's encrypted form.
pub async fn issue_api_key(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: RequireOwner,
) -> Result<(StatusCode, CookieJar, Json<IssueApiKeyResponse>), ApiError> {
    debug!(owner = %auth.owner_id, "issuing API key");

    let issued = state
        .api_key_service
        .issue(&auth.owner_id)
        .await
        .map_err(ApiError::from)?;

    let jar = cookies::store(jar, &issued.encrypted);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(IssueApiKeyResponse {
            api_key: issued.raw.to_hex(),
            created_at: issued.created_at,
        }),
    ))
}

/// GET /api-keys
///
/// Lists the caller's other active keys, oldest first. The key
/// authenticating this request is excluded so it cannot be revoked from the
/// listing.
pub async fn list_api_keys(
    State(state): State<AppState>,
    auth: RequireOwner,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    let keys = state
        .api_key_service
        .list_other_keys(&auth.owner_id, &auth.prefix)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ListApiKeysResponse {
        api_keys: keys
            .into_iter()
            .map(|k| ApiKeySummaryResponse {
                prefix: k.prefix.to_hex(),
                created_at: k.created_at,
            })
            .collect(),
        prefix_length: state.api_key_service.prefix_length(),
    }))
}

/// DELETE /api-keys
///
/// Revokes one of the caller's keys by prefix. The key authenticating this
/// request is never revoked.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    auth: RequireOwner,
    Json(request): Json<RevokeApiKeyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let prefix_hex = request
        .prefix
        .ok_or_else(|| ApiError::unprocessable("must supply an API key prefix to revoke"))?;

    let prefix = KeyPrefix::from_hex(&prefix_hex)
        .map_err(|_| ApiError::unprocessable("API key prefix is not valid hex"))?;

    state
        .api_key_service
        .revoke(&auth.owner_id, &prefix, &auth.prefix)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(serde_json::json!({})))
}
