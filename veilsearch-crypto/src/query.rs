//! Query-vector fan-out across active key generations.
//!
//! During a rotation window the index holds ciphertext vectors produced
//! under both the previous and the current key, so one logical query must
//! be transformed under every active version and all candidates submitted.
//! Result fan-in (top-k re-ranking across candidates) is the caller's job;
//! this component only produces the candidate vectors.

use crate::error::CryptoResult;
use crate::metadata::Metadata;
use crate::secret::SecretStore;
use crate::vector::{EncryptedVector, PlaintextVector, VectorTransformer};
use std::collections::HashMap;
use std::sync::Arc;

/// Produces one transformed query vector per active key version.
pub struct QueryVectorGenerator {
    store: Arc<SecretStore>,
    transformer: Arc<VectorTransformer>,
}

impl QueryVectorGenerator {
    /// The transformer is shared with the ingestion path so both sides see
    /// the same per-path dimension registry.
    pub fn new(store: Arc<SecretStore>, transformer: Arc<VectorTransformer>) -> Self {
        Self { store, transformer }
    }

    /// For each labeled query, returns candidates in version order: current
    /// first, then previous if a rotation window is open.
    pub fn generate_query_vectors(
        &self,
        queries: HashMap<String, PlaintextVector>,
        metadata: &Metadata,
    ) -> CryptoResult<HashMap<String, Vec<EncryptedVector>>> {
        let mut out = HashMap::with_capacity(queries.len());
        for (label, query) in queries {
            let vector_secret = self.store.vector_secret(&query.secret_path)?;
            let factor = vector_secret.approximation_factor();
            let rotatable = vector_secret.rotatable();

            let mut candidates = Vec::with_capacity(rotatable.active_versions().len());
            candidates.push(
                self.transformer
                    .encrypt_under(&query, metadata, rotatable.current(), factor)?,
            );
            if let Some(previous) = rotatable.previous() {
                candidates.push(self.transformer.encrypt_under(&query, metadata, previous, factor)?);
            }
            out.insert(label, candidates);
        }
        Ok(out)
    }
}
