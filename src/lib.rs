//! Keygate
//!
//! API credential issuance and validation service:
//! - Long-lived API keys for authenticated browser sessions
//! - Client-side storage of the key in encrypted form only
//! - Prefix-indexed, digest-verified key resolution on every request
//! - Key lifecycle: issue, rotate, revoke

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use infrastructure::api_key::{
    ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository,
};
use infrastructure::crypto::EncryptionSecret;

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let secret = match &config.auth.encryption_secret {
        Some(hex) => EncryptionSecret::from_hex(hex)?,
        None => {
            warn!(
                "No auth.encryption_secret configured. Generating an ephemeral secret; \
                issued credentials will NOT survive a restart. \
                Run `keygate generate-secret` and set APP_AUTH__ENCRYPTION_SECRET."
            );
            EncryptionSecret::generate()?
        }
    };
    let secret = Arc::new(secret);

    let generator = ApiKeyGenerator::new(
        config.auth.api_key_length,
        config.auth.api_key_prefix_length,
    )?;

    let api_key_service: Arc<dyn api::state::ApiKeyServiceTrait> =
        match config.storage.backend.as_str() {
            "postgres" => {
                let database_url = config
                    .storage
                    .database_url
                    .clone()
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "storage.backend is 'postgres' but no database URL is configured"
                        )
                    })?;

                info!("Connecting to PostgreSQL...");
                let pool = sqlx::PgPool::connect(&database_url)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
                info!("PostgreSQL connection established");

                let repository = PostgresApiKeyRepository::new(pool);
                repository.ensure_schema().await?;

                Arc::new(
                    ApiKeyService::new(Arc::new(repository), secret).with_generator(generator),
                )
            }
            _ => {
                info!("Using in-memory key store");
                Arc::new(
                    ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new()), secret)
                        .with_generator(generator),
                )
            }
        };

    Ok(AppState::new(api_key_service))
}
