//! Error types for the encryption core.
//!
//! Failures are surfaced to the caller immediately — there is no local
//! recovery or fallback, since proceeding with the wrong key or context
//! would be a confidentiality violation. Authentication and key-lookup
//! errors never carry key material or partial plaintext.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the encryption core.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unknown secret path: {0}")]
    UnknownSecretPath(String),

    #[error("unknown key version: {0}")]
    UnknownKeyVersion(u32),

    #[error("authentication failed (wrong key, tampered data, or context mismatch)")]
    AuthenticationFailure,

    /// `expected == 0` means no dimension had been established for the path
    /// yet — the input itself was empty.
    #[error("vector dimension mismatch for secret path '{path}': got {actual}, established {expected}")]
    DimensionMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("ciphertext too short or header malformed")]
    MalformedCiphertext,

    #[error("encryption failed: {0}")]
    Encryption(String),
}
