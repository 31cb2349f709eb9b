//! Cryptographic infrastructure

pub mod cipher;

pub use cipher::{EncryptionSecret, IV_LEN, SECRET_LEN};
