//! Document ingestion: embed, encrypt, hand off to the index.
//!
//! For each document the vector transform and the attached-text encryption
//! are issued together and joined before the record is assembled — the
//! index record is written once with all fields populated, never partially.

use crate::embedder::Embedder;
use crate::error::{PipelineError, PipelineResult};
use crate::index::VectorIndex;
use crate::record::{encode_field, IndexDocument, SourceDocument};
use std::sync::Arc;
use tracing::{debug, info};
use veilsearch_crypto::{EncryptionSession, PlaintextVector};

/// Key-family and embedding parameters for an ingestion run.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub secret_path: String,
    pub derivation_path: String,
    pub dimensions: usize,
}

/// Embeds and encrypts source documents into index-ready records.
pub struct IngestPipeline<E: Embedder> {
    session: Arc<EncryptionSession>,
    embedder: E,
    config: IngestConfig,
}

impl<E: Embedder> IngestPipeline<E> {
    pub fn new(session: Arc<EncryptionSession>, embedder: E, config: IngestConfig) -> Self {
        Self {
            session,
            embedder,
            config,
        }
    }

    /// Embeds and encrypts a batch, preserving input order.
    pub async fn encrypt_batch(
        &self,
        documents: &[SourceDocument],
    ) -> PipelineResult<Vec<IndexDocument>> {
        let titles: Vec<String> = documents.iter().map(|d| d.title.clone()).collect();
        let contents: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();

        let title_embeddings = self
            .embedder
            .embed_batch(&titles, self.config.dimensions)
            .await?;
        let content_embeddings = self
            .embedder
            .embed_batch(&contents, self.config.dimensions)
            .await?;
        debug!(count = documents.len(), "embedded document batch");

        let mut batch = Vec::with_capacity(documents.len());
        for (i, document) in documents.iter().enumerate() {
            let title_vector = PlaintextVector::new(
                title_embeddings[i].clone(),
                self.config.secret_path.clone(),
                self.config.derivation_path.clone(),
            );
            let content_vector = PlaintextVector::new(
                content_embeddings[i].clone(),
                self.config.secret_path.clone(),
                self.config.derivation_path.clone(),
            );

            let (encrypted_content_vector, encrypted_content) = tokio::try_join!(
                async { Ok::<_, PipelineError>(self.session.encrypt_vector(&content_vector)?) },
                async {
                    Ok::<_, PipelineError>(self.session.encrypt_text(document.content.as_bytes())?)
                },
            )?;

            let (encrypted_title_vector, encrypted_title) = tokio::try_join!(
                async { Ok::<_, PipelineError>(self.session.encrypt_vector(&title_vector)?) },
                async {
                    Ok::<_, PipelineError>(self.session.encrypt_text(document.title.as_bytes())?)
                },
            )?;

            batch.push(IndexDocument {
                id: document.id.clone(),
                title: encode_field(&encrypted_title),
                content: encode_field(&encrypted_content),
                category: document.category.clone(),
                title_vector: encrypted_title_vector.encrypted_vector,
                content_vector: encrypted_content_vector.encrypted_vector,
            });
        }
        Ok(batch)
    }

    /// Encrypts a batch and uploads it to the index.
    pub async fn ingest(
        &self,
        documents: &[SourceDocument],
        index: &impl VectorIndex,
    ) -> PipelineResult<usize> {
        let batch = self.encrypt_batch(documents).await?;
        index.upsert(&batch).await?;
        info!(
            count = batch.len(),
            tenant = self.session.metadata().tenant_id(),
            "uploaded encrypted documents"
        );
        Ok(batch.len())
    }
}
