use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::api_keys;
use super::health;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        // Key lifecycle endpoints
        .route(
            "/api-keys",
            get(api_keys::list_api_keys)
                .post(api_keys::issue_api_key)
                .delete(api_keys::revoke_api_key),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
