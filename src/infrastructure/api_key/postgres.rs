//! PostgreSQL key store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::api_key::{
    ApiKeyRepository, ApiKeySummary, KeyPrefix, OwnerId, StoredKeyRecord,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of `ApiKeyRepository`.
///
/// Prefix uniqueness is enforced by the primary key, not assumed. Insert and
/// delete each run in a single transaction.
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the key store table exists
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                prefix BYTEA PRIMARY KEY,
                hash BYTEA NOT NULL,
                owner_id TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create api_keys table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_api_keys_owner ON api_keys (owner_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create owner index: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn insert(
        &self,
        prefix: &KeyPrefix,
        hash: &[u8],
        owner_id: &OwnerId,
    ) -> Result<DateTime<Utc>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let row = sqlx::query(
            r#"
            INSERT INTO api_keys (prefix, hash, owner_id)
            VALUES ($1, $2, $3)
            RETURNING created_at
            "#,
        )
        .bind(prefix.as_bytes())
        .bind(hash)
        .bind(owner_id.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "API key with prefix '{}' already exists",
                    prefix.to_hex()
                ))
            } else {
                DomainError::storage(format!("Failed to insert API key: {}", e))
            }
        })?;

        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| DomainError::storage(format!("Failed to read created_at: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit insert: {}", e)))?;

        Ok(created_at)
    }

    async fn get_by_prefix(
        &self,
        prefix: &KeyPrefix,
    ) -> Result<Option<StoredKeyRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT prefix, hash, owner_id, created_at
            FROM api_keys
            WHERE prefix = $1
            "#,
        )
        .bind(prefix.as_bytes())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up API key: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_for_owner(
        &self,
        owner_id: &OwnerId,
        excluding_prefix: &KeyPrefix,
    ) -> Result<Vec<ApiKeySummary>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT prefix, created_at
            FROM api_keys
            WHERE owner_id = $1 AND prefix <> $2
            ORDER BY created_at
            "#,
        )
        .bind(owner_id.as_str())
        .bind(excluding_prefix.as_bytes())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter()
            .map(|row| {
                let prefix: Vec<u8> = row
                    .try_get("prefix")
                    .map_err(|e| DomainError::storage(format!("Failed to read prefix: {}", e)))?;
                let created_at: DateTime<Utc> = row.try_get("created_at").map_err(|e| {
                    DomainError::storage(format!("Failed to read created_at: {}", e))
                })?;

                Ok(ApiKeySummary {
                    prefix: KeyPrefix::from_bytes(prefix),
                    created_at,
                })
            })
            .collect()
    }

    async fn delete(
        &self,
        owner_id: &OwnerId,
        prefix: &KeyPrefix,
        excluding_prefix: &KeyPrefix,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let result = sqlx::query(
            r#"
            DELETE FROM api_keys
            WHERE owner_id = $1 AND prefix = $2 AND prefix <> $3
            "#,
        )
        .bind(owner_id.as_str())
        .bind(prefix.as_bytes())
        .bind(excluding_prefix.as_bytes())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit delete: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<StoredKeyRecord, DomainError> {
    let prefix: Vec<u8> = row
        .try_get("prefix")
        .map_err(|e| DomainError::storage(format!("Failed to read prefix: {}", e)))?;
    let hash: Vec<u8> = row
        .try_get("hash")
        .map_err(|e| DomainError::storage(format!("Failed to read hash: {}", e)))?;
    let owner_id: String = row
        .try_get("owner_id")
        .map_err(|e| DomainError::storage(format!("Failed to read owner_id: {}", e)))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::storage(format!("Failed to read created_at: {}", e)))?;

    Ok(StoredKeyRecord {
        prefix: KeyPrefix::from_bytes(prefix),
        hash,
        owner_id: OwnerId::new(owner_id),
        created_at,
    })
}
