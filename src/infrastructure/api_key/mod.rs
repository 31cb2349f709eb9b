//! API key infrastructure implementations

mod generator;
mod in_memory;
mod postgres;
mod service;

pub use generator::{ApiKeyGenerator, DEFAULT_KEY_LENGTH, DEFAULT_PREFIX_LENGTH};
pub use in_memory::InMemoryApiKeyRepository;
pub use postgres::PostgresApiKeyRepository;
pub use service::{ApiKeyService, AuthenticatedKey, IssuedApiKey};
