//! Rotation-aware encrypted search.
//!
//! One logical query fans out into one ciphertext query vector per active
//! key generation. All candidates go to the index in a single request, and
//! the hits are merged client-side: best score per document id, re-ranked,
//! truncated, then decrypted.

use crate::embedder::Embedder;
use crate::error::{PipelineError, PipelineResult};
use crate::index::{IndexHit, VectorIndex};
use crate::record::decode_field;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use veilsearch_crypto::{EncryptionSession, PlaintextVector};

const QUERY_LABEL: &str = "vec_1";

/// Query-side parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub secret_path: String,
    pub derivation_path: String,
    pub dimensions: usize,
    /// Vector fields searched by the index (e.g. titleVector, contentVector).
    pub vector_fields: Vec<String>,
    /// Neighbors requested from the index before client-side merging.
    pub k_nearest: usize,
}

/// A decrypted search result.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub score: f32,
}

/// Runs encrypted k-NN queries and decrypts the results.
pub struct SearchPipeline<E: Embedder, I: VectorIndex> {
    session: Arc<EncryptionSession>,
    embedder: E,
    index: I,
    config: SearchConfig,
}

impl<E: Embedder, I: VectorIndex> SearchPipeline<E, I> {
    pub fn new(session: Arc<EncryptionSession>, embedder: E, index: I, config: SearchConfig) -> Self {
        Self {
            session,
            embedder,
            index,
            config,
        }
    }

    /// Embeds the query text, fans out across active key generations,
    /// queries the index, and returns the top results decrypted.
    pub async fn search(&self, query: &str, top: usize) -> PipelineResult<Vec<SearchHit>> {
        let embedding = self.embedder.embed(query, self.config.dimensions).await?;
        let plaintext_query = PlaintextVector::new(
            embedding,
            self.config.secret_path.clone(),
            self.config.derivation_path.clone(),
        );

        let mut queries = HashMap::new();
        queries.insert(QUERY_LABEL.to_string(), plaintext_query);
        let mut candidates = self.session.prepare_query(queries)?;
        let fan_out = candidates
            .remove(QUERY_LABEL)
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.encrypted_vector)
            .collect::<Vec<_>>();
        debug!(
            candidates = fan_out.len(),
            tenant = self.session.metadata().tenant_id(),
            "prepared query vectors"
        );

        let hits = self
            .index
            .query(&fan_out, &self.config.vector_fields, self.config.k_nearest)
            .await?;

        let merged = merge_hits(hits, top);
        let mut results = Vec::with_capacity(merged.len());
        for hit in merged {
            results.push(self.decrypt_hit(hit)?);
        }
        Ok(results)
    }

    fn decrypt_hit(&self, hit: IndexHit) -> PipelineResult<SearchHit> {
        let title = self.session.decrypt_text(&decode_field(&hit.title)?)?;
        let content = self.session.decrypt_text(&decode_field(&hit.content)?)?;
        Ok(SearchHit {
            id: hit.id,
            title: String::from_utf8(title).map_err(|_| PipelineError::InvalidUtf8)?,
            content: String::from_utf8(content).map_err(|_| PipelineError::InvalidUtf8)?,
            category: hit.category,
            score: hit.score,
        })
    }
}

/// Client-side fan-in: best score per document id, re-ranked, truncated.
fn merge_hits(hits: Vec<IndexHit>, top: usize) -> Vec<IndexHit> {
    let mut best: HashMap<String, IndexHit> = HashMap::new();
    for hit in hits {
        match best.get(&hit.id) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.id.clone(), hit);
            }
        }
    }
    let mut merged: Vec<IndexHit> = best.into_values().collect();
    merged.sort_by(|a, b| b.score.total_cmp(&a.score));
    merged.truncate(top);
    merged
}
