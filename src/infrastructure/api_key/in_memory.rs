//! In-memory key store implementation
//!
//! Backs tests and local development. Mirrors the transactional semantics of
//! the PostgreSQL store: every operation runs under a single lock, so a
//! concurrent lookup never observes a half-applied mutation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::api_key::{
    ApiKeyRepository, ApiKeySummary, KeyPrefix, OwnerId, StoredKeyRecord,
};
use crate::domain::DomainError;

/// In-memory implementation of `ApiKeyRepository`
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    records: RwLock<Vec<StoredKeyRecord>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new in-memory key store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn insert(
        &self,
        prefix: &KeyPrefix,
        hash: &[u8],
        owner_id: &OwnerId,
    ) -> Result<DateTime<Utc>, DomainError> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| &r.prefix == prefix) {
            return Err(DomainError::conflict(format!(
                "API key with prefix '{}' already exists",
                prefix.to_hex()
            )));
        }

        let created_at = Utc::now();
        records.push(StoredKeyRecord {
            prefix: prefix.clone(),
            hash: hash.to_vec(),
            owner_id: owner_id.clone(),
            created_at,
        });

        Ok(created_at)
    }

    async fn get_by_prefix(
        &self,
        prefix: &KeyPrefix,
    ) -> Result<Option<StoredKeyRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| &r.prefix == prefix).cloned())
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
        excluding_prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeySummary>, DomainError> {
        let records = self.records.read().await;

        // Records are kept in insertion order, so the stable sort preserves
        // it for identical timestamps.
        let mut summaries: Vec<ApiKeySummary> = records
            .iter()
            .filter(|r| &r.owner_id == owner_id && &r.prefix != excluding_prefix)
            .map(|r| ApiKeySummary {
                prefix: r.prefix.clone(),
                created_at: r.created_at,
            })
            .collect();

        summaries.sort_by_key(|s| s.created_at);

        Ok(summaries)
    }

    async fn delete(
        &self,
        owner_id: &OwnerId,
        prefix: &KeyPrefix,
        excluding_prefix: &KeyPrefix,
    ) -> Result<bool, DomainError> {
        if prefix == excluding_prefix {
            return Ok(false);
        }

        let mut records = self.records.write().await;

        match records
            .iter()
            .position(|r| &r.prefix == prefix && &r.owner_id == owner_id)
        {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(bytes: &[u8]) -> KeyPrefix {
        KeyPrefix::from_bytes(bytes.to_vec())
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = OwnerId::new("u1");

        repo.insert(&prefix(b"aaaaaaaa"), &[1u8; 32], &owner)
            .await
            .unwrap();

        let record = repo.get_by_prefix(&prefix(b"aaaaaaaa")).await.unwrap();
        assert_eq!(record.unwrap().owner_id, owner);
    }

    #[tokio::test]
    async fn test_lookup_unknown_prefix() {
        let repo = InMemoryApiKeyRepository::new();

        let record = repo.get_by_prefix(&prefix(b"missing!")).await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_lookup_never_crosses_owners() {
        let repo = InMemoryApiKeyRepository::new();
        let u1 = OwnerId::new("u1");
        let u2 = OwnerId::new("u2");

        repo.insert(&prefix(b"aaaaaaaa"), &[1u8; 32], &u1)
            .await
            .unwrap();
        repo.insert(&prefix(b"bbbbbbbb"), &[2u8; 32], &u2)
            .await
            .unwrap();

        let record = repo
            .get_by_prefix(&prefix(b"aaaaaaaa"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.owner_id, u1);
        assert_ne!(record.owner_id, u2);
    }

    #[tokio::test]
    async fn test_duplicate_prefix_conflicts() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = OwnerId::new("u1");

        repo.insert(&prefix(b"aaaaaaaa"), &[1u8; 32], &owner)
            .await
            .unwrap();

        let result = repo.insert(&prefix(b"aaaaaaaa"), &[2u8; 32], &owner).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_misses() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = OwnerId::new("u1");

        repo.insert(&prefix(b"aaaaaaaa"), &[1u8; 32], &owner)
            .await
            .unwrap();

        let deleted = repo
            .delete(&owner, &prefix(b"aaaaaaaa"), &prefix(b"bbbbbbbb"))
            .await
            .unwrap();
        assert!(deleted);

        let record = repo.get_by_prefix(&prefix(b"aaaaaaaa")).await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_delete_refuses_current_key() {
        // Deleting the key that authenticates the current request is refused
        // even though it belongs to the caller.
        let repo = InMemoryApiKeyRepository::new();
        let owner = OwnerId::new("u1");

        repo.insert(&prefix(b"aaaaaaaa"), &[1u8; 32], &owner)
            .await
            .unwrap();

        let deleted = repo
            .delete(&owner, &prefix(b"aaaaaaaa"), &prefix(b"aaaaaaaa"))
            .await
            .unwrap();
        assert!(!deleted);

        let record = repo.get_by_prefix(&prefix(b"aaaaaaaa")).await.unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn test_delete_refuses_foreign_key() {
        let repo = InMemoryApiKeyRepository::new();
        let u1 = OwnerId::new("u1");
        let u2 = OwnerId::new("u2");

        repo.insert(&prefix(b"aaaaaaaa"), &[1u8; 32], &u1)
            .await
            .unwrap();

        let deleted = repo
            .delete(&u2, &prefix(b"aaaaaaaa"), &prefix(b"cccccccc"))
            .await
            .unwrap();
        assert!(!deleted);
        assert!(repo
            .get_by_prefix(&prefix(b"aaaaaaaa"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_list_orders_by_creation_and_excludes_current() {
        let repo = InMemoryApiKeyRepository::new();
        let owner = OwnerId::new("u1");
        let other = OwnerId::new("u2");

        repo.insert(&prefix(b"first..."), &[1u8; 32], &owner)
            .await
            .unwrap();
        repo.insert(&prefix(b"second.."), &[2u8; 32], &owner)
            .await
            .unwrap();
        repo.insert(&prefix(b"current."), &[3u8; 32], &owner)
            .await
            .unwrap();
        repo.insert(&prefix(b"foreign."), &[4u8; 32], &other)
            .await
            .unwrap();

        let listed = repo
            .list_for_owner(&owner, &prefix(b"current."))
            .await
            .unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].prefix, prefix(b"first..."));
        assert_eq!(listed[1].prefix, prefix(b"second.."));
        assert!(listed[0].created_at <= listed[1].created_at);
    }

    #[tokio::test]
    async fn test_list_for_owner_without_keys() {
        let repo = InMemoryApiKeyRepository::new();

        let listed = repo
            .list_for_owner(&OwnerId::new("nobody"), &prefix(b"current."))
            .await
            .unwrap();

        assert!(listed.is_empty());
    }
}
