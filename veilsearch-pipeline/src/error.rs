//! Pipeline error types.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while ingesting or querying documents.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("crypto error: {0}")]
    Crypto(#[from] veilsearch_crypto::CryptoError),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("index operation failed: {0}")]
    Index(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base64 field: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,
}
