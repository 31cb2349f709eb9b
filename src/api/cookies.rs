//! Credential transport over cookies
//!
//! Reads and writes exactly two opaque tokens: the encrypted key and its
//! initialization vector, both hex. No cryptographic logic lives here; the
//! tokens are passed through to the crypto layer untouched.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::domain::api_key::EncryptedApiKey;

/// Well-known cookie names for the credential tokens
pub struct CookieNames;

impl CookieNames {
    pub const ENCRYPTED_API_KEY: &'static str = "keygate.encrypted_api_key";
    pub const API_KEY_INITIALIZATION_VECTOR: &'static str =
        "keygate.api_key_initialization_vector";
}

/// The two tokens as read from the client
#[derive(Debug, Clone)]
pub struct TransportTokens {
    pub initialization_vector: String,
    pub ciphertext: String,
}

/// Write both credential tokens, replacing any previous credential.
pub fn store(jar: CookieJar, encrypted: &EncryptedApiKey) -> CookieJar {
    jar.add(credential_cookie(
        CookieNames::ENCRYPTED_API_KEY,
        encrypted.hex_encoded(),
    ))
    .add(credential_cookie(
        CookieNames::API_KEY_INITIALIZATION_VECTOR,
        encrypted.hex_encoded_initialization_vector(),
    ))
}

/// Read both credential tokens.
///
/// Returns `None` when either token is missing. That is not an error; it
/// signals an unauthenticated client to the caller.
pub fn load(jar: &CookieJar) -> Option<TransportTokens> {
    let initialization_vector = jar.get(CookieNames::API_KEY_INITIALIZATION_VECTOR)?;
    let ciphertext = jar.get(CookieNames::ENCRYPTED_API_KEY)?;

    Some(TransportTokens {
        initialization_vector: initialization_vector.value().to_string(),
        ciphertext: ciphertext.value().to_string(),
    })
}

fn credential_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::KeyPrefix;

    fn test_encrypted_key() -> EncryptedApiKey {
        EncryptedApiKey::new(
            vec![0xca, 0xfe, 0xba, 0xbe],
            vec![0x0f; 12],
            KeyPrefix::from_bytes(vec![0xca]),
            vec![0x00; 32],
        )
    }

    #[test]
    fn test_store_then_load_round_trip() {
        let jar = store(CookieJar::new(), &test_encrypted_key());

        let tokens = load(&jar).unwrap();
        assert_eq!(tokens.ciphertext, "cafebabe");
        assert_eq!(tokens.initialization_vector, "0f0f0f0f0f0f0f0f0f0f0f0f");
    }

    #[test]
    fn test_load_with_missing_token_is_absent() {
        assert!(load(&CookieJar::new()).is_none());

        // Only one of the two tokens present.
        let jar = CookieJar::new().add(Cookie::new(CookieNames::ENCRYPTED_API_KEY, "cafe"));
        assert!(load(&jar).is_none());

        let jar = CookieJar::new().add(Cookie::new(
            CookieNames::API_KEY_INITIALIZATION_VECTOR,
            "0f0f",
        ));
        assert!(load(&jar).is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let jar = store(CookieJar::new(), &test_encrypted_key());

        for name in [
            CookieNames::ENCRYPTED_API_KEY,
            CookieNames::API_KEY_INITIALIZATION_VECTOR,
        ] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        }
    }

    #[test]
    fn test_store_replaces_previous_credential() {
        let jar = store(CookieJar::new(), &test_encrypted_key());

        let replacement = EncryptedApiKey::new(
            vec![0x11, 0x22],
            vec![0xee; 12],
            KeyPrefix::from_bytes(vec![0x11]),
            vec![0x00; 32],
        );
        let jar = store(jar, &replacement);

        let tokens = load(&jar).unwrap();
        assert_eq!(tokens.ciphertext, "1122");
        assert_eq!(tokens.initialization_vector, "eeeeeeeeeeeeeeeeeeeeeeee");
    }
}
