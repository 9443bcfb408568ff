//! External search index interface.
//!
//! The index stores opaque ciphertext fields and fixed-dimension ciphertext
//! vectors, and answers k-nearest-neighbor queries. It must accept multiple
//! query vectors per request — the rotation fan-out submits one candidate
//! per active key generation — and leave result merging to the client.

use crate::error::PipelineResult;
use crate::record::IndexDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One ranked result from the index. Title and content are still
/// base64-encoded ciphertext; category and score are plaintext metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexHit {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub score: f32,
}

/// Opaque vector store with upsert and k-NN query.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Writes or replaces a batch of records. Each record is written once
    /// with all fields populated.
    async fn upsert(&self, documents: &[IndexDocument]) -> PipelineResult<()>;

    /// k-NN query over the named vector fields with one or more query
    /// vectors. Returns ranked hits; the caller merges across candidates.
    async fn query(
        &self,
        query_vectors: &[Vec<f32>],
        fields: &[String],
        k: usize,
    ) -> PipelineResult<Vec<IndexHit>>;
}
