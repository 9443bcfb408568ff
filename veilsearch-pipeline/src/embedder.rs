//! External embedding service interface.
//!
//! The embedder is a black box: callers choose the dimensionality per call
//! site, and two calls for the same text need not be bit-identical. Network
//! transport, batching against a real service, and retry policy live behind
//! implementations of this trait, outside the encryption core.

use crate::error::PipelineResult;
use async_trait::async_trait;

/// Opaque text-to-vector function.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds one text into a vector of the requested dimensionality.
    async fn embed(&self, text: &str, dimensions: usize) -> PipelineResult<Vec<f32>>;

    /// Embeds a batch of texts. The default issues one call per text;
    /// implementations backed by a batching API should override this.
    async fn embed_batch(
        &self,
        texts: &[String],
        dimensions: usize,
    ) -> PipelineResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text, dimensions).await?);
        }
        Ok(out)
    }
}
