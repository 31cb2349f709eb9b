//! API key value objects and stored record types

use chrono::{DateTime, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::DomainError;

/// Owner identity an API key resolves to. Opaque reference to an external
/// user record; never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unencrypted API key material.
///
/// Exists only transiently: generated at issuance, shown once to the caller
/// as hex text, recovered per request by decrypting the transport tokens.
/// Never persisted and never logged; the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RawApiKey(Vec<u8>);

impl RawApiKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse a key from its hex text form (e.g. the `X-API-Key` header).
    pub fn from_hex(text: &str) -> Result<Self, DomainError> {
        let bytes = hex::decode(text)
            .map_err(|_| DomainError::malformed_input("API key is not valid hex"))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The hex text shown to the user exactly once at issuance time.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The leading `length` bytes, used as the non-secret storage index.
    pub fn prefix(&self, length: usize) -> KeyPrefix {
        KeyPrefix::from_bytes(self.0[..length.min(self.0.len())].to_vec())
    }
}

// Key material must never end up in logs, so Debug elides the bytes.
impl std::fmt::Debug for RawApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawApiKey({} bytes)", self.0.len())
    }
}

/// Leading bytes of a raw key. Non-secret lookup index for the key store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPrefix(Vec<u8>);

impl KeyPrefix {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(text: &str) -> Result<Self, DomainError> {
        let bytes = hex::decode(text)
            .map_err(|_| DomainError::malformed_input("key prefix is not valid hex"))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The encrypted transport form of an API key plus its storage derivations.
///
/// `prefix` and `hash` are computed from the raw key only, never from the
/// ciphertext. The ciphertext and initialization vector travel to the client;
/// prefix and hash go to the key store.
#[derive(Debug, Clone)]
pub struct EncryptedApiKey {
    ciphertext: Vec<u8>,
    initialization_vector: Vec<u8>,
    prefix: KeyPrefix,
    hash: Vec<u8>,
}

impl EncryptedApiKey {
    pub fn new(
        ciphertext: Vec<u8>,
        initialization_vector: Vec<u8>,
        prefix: KeyPrefix,
        hash: Vec<u8>,
    ) -> Self {
        Self {
            ciphertext,
            initialization_vector,
            prefix,
            hash,
        }
    }

    pub fn prefix(&self) -> &KeyPrefix {
        &self.prefix
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Lowercase hex form of the ciphertext, as carried by the client.
    pub fn hex_encoded(&self) -> String {
        hex::encode(&self.ciphertext)
    }

    /// Lowercase hex form of the per-encryption initialization vector.
    pub fn hex_encoded_initialization_vector(&self) -> String {
        hex::encode(&self.initialization_vector)
    }
}

/// A persisted key record as the store returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredKeyRecord {
    pub prefix: KeyPrefix,
    pub hash: Vec<u8>,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

/// Listing entry for a user's other active keys. Carries no secret material.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeySummary {
    pub prefix: KeyPrefix,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_key_hex_round_trip() {
        let raw = RawApiKey::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(raw.to_hex(), "deadbeef");

        let parsed = RawApiKey::from_hex("deadbeef").unwrap();
        assert_eq!(parsed, raw);
    }

    #[test]
    fn test_raw_key_from_invalid_hex() {
        let result = RawApiKey::from_hex("not-hex!");
        assert!(matches!(
            result,
            Err(DomainError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_prefix_is_leading_raw_bytes() {
        let raw = RawApiKey::from_bytes((0u8..32).collect());

        for n in [1usize, 4, 8, 16, 32] {
            assert_eq!(raw.prefix(n).as_bytes(), &raw.as_bytes()[..n]);
        }
    }

    #[test]
    fn test_prefix_clamps_to_key_length() {
        let raw = RawApiKey::from_bytes(vec![1, 2, 3]);
        assert_eq!(raw.prefix(8).as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_key_prefix_hex_round_trip() {
        let prefix = KeyPrefix::from_bytes(vec![0x00, 0x11, 0xff]);
        assert_eq!(prefix.to_hex(), "0011ff");
        assert_eq!(KeyPrefix::from_hex("0011ff").unwrap(), prefix);
    }

    #[test]
    fn test_raw_key_debug_is_redacted() {
        let raw = RawApiKey::from_bytes(vec![0xaa; 32]);
        let rendered = format!("{:?}", raw);

        assert_eq!(rendered, "RawApiKey(32 bytes)");
        assert!(!rendered.contains("aa"));
    }

    #[test]
    fn test_encrypted_key_hex_accessors() {
        let encrypted = EncryptedApiKey::new(
            vec![0xca, 0xfe],
            vec![0x01; 12],
            KeyPrefix::from_bytes(vec![0xca]),
            vec![0x02; 32],
        );

        assert_eq!(encrypted.hex_encoded(), "cafe");
        assert_eq!(
            encrypted.hex_encoded_initialization_vector(),
            "010101010101010101010101"
        );
    }
}
