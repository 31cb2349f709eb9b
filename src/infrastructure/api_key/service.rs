//! API key service
//!
//! High-level key lifecycle operations: issue, authenticate, list, revoke.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::api_key::{
    ApiKeyRepository, ApiKeySummary, EncryptedApiKey, KeyPrefix, OwnerId, RawApiKey,
};
use crate::domain::DomainError;
use crate::infrastructure::crypto::EncryptionSecret;

use super::generator::ApiKeyGenerator;

/// Result of issuing a new API key
#[derive(Debug)]
pub struct IssuedApiKey {
    /// The raw key material (shown to the caller exactly once)
    pub raw: RawApiKey,
    /// The encrypted transport form
    pub encrypted: EncryptedApiKey,
    /// When the store recorded the key
    pub created_at: DateTime<Utc>,
}

/// Identity resolved from a presented API key
#[derive(Debug, Clone)]
pub struct AuthenticatedKey {
    pub owner_id: OwnerId,
    /// Prefix of the key authenticating the current request. Handlers pass
    /// it back to list/revoke so a caller can never act on this key.
    pub prefix: KeyPrefix,
}

/// API key service for the key lifecycle
#[derive(Debug)]
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    generator: ApiKeyGenerator,
    secret: Arc<EncryptionSecret>,
}

impl<R: ApiKeyRepository> ApiKeyService<R> {
    /// Create a new API key service
    pub fn new(repository: Arc<R>, secret: Arc<EncryptionSecret>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
            secret,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn prefix_length(&self) -> usize {
        self.generator.prefix_length()
    }

    /// Issue a new API key for an owner.
    ///
    /// Generates fresh key material, derives the encrypted transport form,
    /// and persists the `(prefix, hash, owner)` record.
    pub async fn issue(&self, owner_id: &OwnerId) -> Result<IssuedApiKey, DomainError> {
        let raw = self.generator.generate()?;
        let encrypted = self.generator.seal(&raw, &self.secret)?;

        let created_at = self
            .repository
            .insert(encrypted.prefix(), encrypted.hash(), owner_id)
            .await?;

        info!(prefix = %encrypted.prefix().to_hex(), "API key issued");

        Ok(IssuedApiKey {
            raw,
            encrypted,
            created_at,
        })
    }

    /// Resolve raw key material to its owner.
    ///
    /// Looks up the key's prefix and then verifies the stored digest against
    /// the presented material before trusting the match, so a prefix
    /// collision alone never grants access.
    pub async fn authenticate(&self, raw: &RawApiKey) -> Result<AuthenticatedKey, DomainError> {
        if raw.len() != self.generator.key_length() {
            return Err(DomainError::malformed_input("unexpected API key length"));
        }

        let prefix = raw.prefix(self.generator.prefix_length());

        let record = self
            .repository
            .get_by_prefix(&prefix)
            .await?
            .ok_or_else(|| DomainError::not_found("no API key matches prefix"))?;

        if !ApiKeyGenerator::verify_digest(raw, &record.hash) {
            debug!(prefix = %prefix.to_hex(), "API key digest mismatch");
            return Err(DomainError::not_found("API key digest mismatch"));
        }

        Ok(AuthenticatedKey {
            owner_id: record.owner_id,
            prefix,
        })
    }

    /// Authenticate from the two hex transport tokens (cookie flow).
    pub async fn authenticate_transport(
        &self,
        initialization_vector_hex: &str,
        ciphertext_hex: &str,
    ) -> Result<AuthenticatedKey, DomainError> {
        let raw =
            self.generator
                .unseal_hex(&self.secret, initialization_vector_hex, ciphertext_hex)?;

        self.authenticate(&raw).await
    }

    /// Authenticate from the raw hex key (`X-API-Key` header flow).
    pub async fn authenticate_header(
        &self,
        key_hex: &str,
    ) -> Result<AuthenticatedKey, DomainError> {
        let raw = RawApiKey::from_hex(key_hex)?;

        self.authenticate(&raw).await
    }

    /// List an owner's other active keys, oldest first.
    pub async fn list_other_keys(
        &self,
        owner_id: &OwnerId,
        current_prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeySummary>, DomainError> {
        self.repository
            .list_for_owner(owner_id, current_prefix)
            .await
    }

    /// Revoke one of an owner's keys. The key authenticating the current
    /// request is never revoked.
    pub async fn revoke(
        &self,
        owner_id: &OwnerId,
        prefix: &KeyPrefix,
        current_prefix: &KeyPrefix,
    ) -> Result<bool, DomainError> {
        let revoked = self
            .repository
            .delete(owner_id, prefix, current_prefix)
            .await?;

        if revoked {
            info!(prefix = %prefix.to_hex(), "API key revoked");
        } else {
            debug!(prefix = %prefix.to_hex(), "API key revocation matched no record");
        }

        Ok(revoked)
    }
}
