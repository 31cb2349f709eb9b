//! API key generation and sealing
//!
//! Produces raw key material from the system CSPRNG and derives the
//! encrypted transport form plus the storage prefix and digest.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::api_key::{EncryptedApiKey, RawApiKey};
use crate::domain::DomainError;
use crate::infrastructure::crypto::cipher::{self, EncryptionSecret};

/// Default raw key length in bytes (64 hex characters for the user).
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Default storage prefix length in bytes.
///
/// A trade-off: shorter prefixes make the indexed lookup cheaper but raise
/// the collision probability across all issued keys. Eight random bytes keep
/// collisions negligible at any realistic key volume.
pub const DEFAULT_PREFIX_LENGTH: usize = 8;

/// Generator for API key material and its derived representations.
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    key_length: usize,
    prefix_length: usize,
}

impl ApiKeyGenerator {
    /// Create a generator, validating the configured lengths.
    pub fn new(key_length: usize, prefix_length: usize) -> Result<Self, DomainError> {
        if key_length == 0 {
            return Err(DomainError::configuration("API key length must be nonzero"));
        }

        if prefix_length == 0 || prefix_length > key_length {
            return Err(DomainError::configuration(format!(
                "API key prefix length must be between 1 and {}",
                key_length
            )));
        }

        Ok(Self {
            key_length,
            prefix_length,
        })
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    /// Generate fresh raw key material.
    ///
    /// The only failure mode is exhaustion of the random source, which is
    /// fatal to the operation.
    pub fn generate(&self) -> Result<RawApiKey, DomainError> {
        let mut bytes = vec![0u8; self.key_length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DomainError::generation(format!("random source failure: {}", e)))?;

        Ok(RawApiKey::from_bytes(bytes))
    }

    /// Derive the encrypted transport form and storage derivations from raw
    /// key material.
    ///
    /// The returned object's prefix and digest are bound to exactly this raw
    /// value; neither is derived from the ciphertext.
    pub fn seal(
        &self,
        raw: &RawApiKey,
        secret: &EncryptionSecret,
    ) -> Result<EncryptedApiKey, DomainError> {
        let prefix = raw.prefix(self.prefix_length);
        let hash = Self::digest(raw);
        let (ciphertext, iv) = cipher::encrypt(secret, raw.as_bytes())?;

        Ok(EncryptedApiKey::new(ciphertext, iv, prefix, hash))
    }

    /// Recover raw key material from hex transport tokens.
    pub fn unseal_hex(
        &self,
        secret: &EncryptionSecret,
        initialization_vector_hex: &str,
        ciphertext_hex: &str,
    ) -> Result<RawApiKey, DomainError> {
        let bytes = cipher::decrypt_hex(secret, initialization_vector_hex, ciphertext_hex)?;

        if bytes.len() != self.key_length {
            return Err(DomainError::decryption("unexpected key length"));
        }

        Ok(RawApiKey::from_bytes(bytes))
    }

    /// One-way digest of the raw key, stored for verification.
    pub fn digest(raw: &RawApiKey) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        hasher.finalize().to_vec()
    }

    /// Verify raw key material against a stored digest.
    pub fn verify_digest(raw: &RawApiKey, stored_hash: &[u8]) -> bool {
        constant_time_compare(&Self::digest(raw), stored_hash)
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self {
            key_length: DEFAULT_KEY_LENGTH,
            prefix_length: DEFAULT_PREFIX_LENGTH,
        }
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;

    for i in 0..a.len() {
        result |= a[i] ^ b[i];
    }

    result == 0
}
