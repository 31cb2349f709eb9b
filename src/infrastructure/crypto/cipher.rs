//! Authenticated encryption for API key transport
//!
//! The only module that touches a cipher directly. All encryption and
//! decryption of key material goes through the two functions exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-GCM (confidentiality + integrity)
//! - **Initialization vector**: 96-bit (12 bytes), fresh per encryption call
//! - **Secret size**: 256 bits (32 bytes)

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::DomainError;

/// Size of the encryption secret in bytes (256 bits).
pub const SECRET_LEN: usize = 32;

/// Size of the initialization vector in bytes (96 bits).
pub const IV_LEN: usize = 12;

/// Process-wide symmetric secret for API key encryption.
///
/// Initialized once at startup from configuration, immutable for the process
/// lifetime, shared read-only by every encrypt/decrypt call. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionSecret([u8; SECRET_LEN]);

impl EncryptionSecret {
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a secret from its 64-character hex configuration form.
    pub fn from_hex(text: &str) -> Result<Self, DomainError> {
        let bytes = hex::decode(text)
            .map_err(|_| DomainError::configuration("encryption secret is not valid hex"))?;

        let bytes: [u8; SECRET_LEN] = bytes.try_into().map_err(|_| {
            DomainError::configuration(format!(
                "encryption secret must be {} bytes ({} hex characters)",
                SECRET_LEN,
                SECRET_LEN * 2
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Generate a fresh secret from the system CSPRNG.
    pub fn generate() -> Result<Self, DomainError> {
        let mut bytes = [0u8; SECRET_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DomainError::generation(format!("random source failure: {}", e)))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

// The secret must never end up in logs, so Debug elides the bytes.
impl std::fmt::Debug for EncryptionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptionSecret(..)")
    }
}

/// Encrypt a payload, returning the ciphertext and the fresh initialization
/// vector used for this call. The IV is never reused across calls with the
/// same secret.
pub fn encrypt(
    secret: &EncryptionSecret,
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), DomainError> {
    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| DomainError::generation(format!("random source failure: {}", e)))?;

    let cipher = Aes256Gcm::new_from_slice(secret.as_bytes())
        .map_err(|_| DomainError::internal("invalid encryption secret length"))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| DomainError::internal("encryption failure"))?;

    Ok((ciphertext, iv.to_vec()))
}

/// Decrypt a ciphertext produced by [`encrypt`].
///
/// Fails if the IV/ciphertext pair does not authenticate (tampering, a
/// wrong secret, or corrupted input). Never returns partial plaintext.
pub fn decrypt(
    secret: &EncryptionSecret,
    initialization_vector: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, DomainError> {
    if initialization_vector.len() != IV_LEN {
        return Err(DomainError::decryption("bad initialization vector length"));
    }

    let cipher = Aes256Gcm::new_from_slice(secret.as_bytes())
        .map_err(|_| DomainError::internal("invalid encryption secret length"))?;

    cipher
        .decrypt(Nonce::from_slice(initialization_vector), ciphertext)
        .map_err(|_| DomainError::decryption("authentication failed"))
}

/// Hex-decode transport tokens and decrypt them.
///
/// Fails with `MalformedInput` when either token is not valid hex, or with
/// `Decryption` when the decoded pair does not authenticate.
pub fn decrypt_hex(
    secret: &EncryptionSecret,
    initialization_vector_hex: &str,
    ciphertext_hex: &str,
) -> Result<Vec<u8>, DomainError> {
    let iv = hex::decode(initialization_vector_hex)
        .map_err(|_| DomainError::malformed_input("initialization vector is not valid hex"))?;
    let ciphertext = hex::decode(ciphertext_hex)
        .map_err(|_| DomainError::malformed_input("ciphertext is not valid hex"))?;

    decrypt(secret, &iv, &ciphertext)
}
