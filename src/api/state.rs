//! Application state for shared services

use std::sync::Arc;

use crate::domain::api_key::{ApiKeyRepository, ApiKeySummary, KeyPrefix, OwnerId};
use crate::domain::DomainError;
use crate::infrastructure::api_key::{ApiKeyService, AuthenticatedKey, IssuedApiKey};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<dyn ApiKeyServiceTrait>,
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(api_key_service: Arc<dyn ApiKeyServiceTrait>) -> Self {
        Self { api_key_service }
    }
}

/// Trait for API key service operations
#[async_trait::async_trait]
pub trait ApiKeyServiceTrait: Send + Sync {
    async fn issue(&self, owner_id: &OwnerId) -> Result<IssuedApiKey, DomainError>;
    async fn authenticate_transport(
        &self,
        initialization_vector_hex: &str,
        ciphertext_hex: &str,
    ) -> Result<AuthenticatedKey, DomainError>;
    async fn authenticate_header(&self, key_hex: &str)
        -> Result<AuthenticatedKey, DomainError>;
    async fn list_other_keys(
        &self,
        owner_id: &OwnerId,
        current_prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeySummary>, DomainError>;
    async fn revoke(
        &self,
        owner_id: &OwnerId,
        prefix: &KeyPrefix,
        current_prefix: &KeyPrefix,
    ) -> Result<bool, DomainError>;
    fn prefix_length(&self) -> usize;
}

#[async_trait::async_trait]
impl<R: ApiKeyRepository + 'static> ApiKeyServiceTrait for ApiKeyService<R> {
    async fn issue(&self, owner_id: &OwnerId) -> Result<IssuedApiKey, DomainError> {
        ApiKeyService::issue(self, owner_id).await
    }

    async fn authenticate_transport(
        &self,
        initialization_vector_hex: &str,
        ciphertext_hex: &str,
    ) -> Result<AuthenticatedKey, DomainError> {
        ApiKeyService::authenticate_transport(self, initialization_vector_hex, ciphertext_hex)
            .await
    }

    async fn authenticate_header(
        &self,
        key_hex: &str,
    ) -> Result<AuthenticatedKey, DomainError> {
        ApiKeyService::authenticate_header(self, key_hex).await
    }

    async fn list_other_keys(
        &self,
        owner_id: &OwnerId,
        current_prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeySummary>, DomainError> {
        ApiKeyService::list_other_keys(self, owner_id, current_prefix).await
    }

    async fn revoke(
        &self,
        owner_id: &OwnerId,
        prefix: &KeyPrefix,
        current_prefix: &KeyPrefix,
    ) -> Result<bool, DomainError> {
        ApiKeyService::revoke(self, owner_id, prefix, current_prefix).await
    }

    fn prefix_length(&self) -> usize {
        ApiKeyService::prefix_length(self)
    }
}
