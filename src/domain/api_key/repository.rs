//! Key store repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{ApiKeySummary, KeyPrefix, OwnerId, StoredKeyRecord};
use crate::domain::DomainError;

/// Repository trait for the persisted key store.
///
/// Implementations must make `insert` and `delete` atomic: a concurrent
/// lookup never observes a half-written record. Prefix uniqueness is an
/// enforced constraint; inserting a duplicate prefix fails with
/// `DomainError::Conflict`.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Persist a new key record, returning its creation timestamp.
    async fn insert(
        &self,
        prefix: &KeyPrefix,
        hash: &[u8],
        owner_id: &OwnerId,
    ) -> Result<DateTime<Utc>, DomainError>;

    /// Fetch the record matching a prefix, if any. Backs authentication.
    async fn get_by_prefix(
        &self,
        prefix: &KeyPrefix,
    ) -> Result<Option<StoredKeyRecord>, DomainError>;

    /// List an owner's keys ordered by creation time ascending, excluding
    /// `excluding_prefix` (the key authenticating the current request).
    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
        excluding_prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeySummary>, DomainError>;

    /// Delete a record only if it belongs to `owner_id` and is not
    /// `excluding_prefix`. Returns whether a record was removed.
    async fn delete(
        &self,
        owner_id: &OwnerId,
        prefix: &KeyPrefix,
        excluding_prefix: &KeyPrefix,
    ) -> Result<bool, DomainError>;
}
