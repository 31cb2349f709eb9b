//! API key domain

mod entity;
mod repository;

pub use entity::{ApiKeySummary, EncryptedApiKey, KeyPrefix, OwnerId, RawApiKey, StoredKeyRecord};
pub use repository::ApiKeyRepository;
