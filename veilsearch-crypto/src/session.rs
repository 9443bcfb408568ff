//! Session façade binding one tenant context over all components.
//!
//! A session is cheap to construct and safe to share across worker tasks:
//! the only shared state is the read-only `SecretStore` behind an `Arc`
//! and the transformer's dimension registry. Independent documents and
//! fields may be encrypted concurrently without ordering constraints.

use crate::attached::AttachedCipher;
use crate::deterministic::DeterministicCipher;
use crate::error::CryptoResult;
use crate::metadata::Metadata;
use crate::query::QueryVectorGenerator;
use crate::secret::SecretStore;
use crate::vector::{EncryptedVector, PlaintextVector, VectorTransformer};
use std::collections::HashMap;
use std::sync::Arc;

/// Plaintext fields of one document, keyed by field name.
#[derive(Debug, Default)]
pub struct DocumentFields {
    pub text: HashMap<String, Vec<u8>>,
    pub vectors: HashMap<String, PlaintextVector>,
}

/// Ciphertext counterpart of [`DocumentFields`]. Vector fields are index
/// keys only and are never decrypted back.
#[derive(Debug, Default)]
pub struct EncryptedDocumentFields {
    pub text: HashMap<String, Vec<u8>>,
    pub vectors: HashMap<String, EncryptedVector>,
}

/// Façade over the secret store, ciphers, transformer, and query generator,
/// bound to one [`Metadata`] context for a batch of operations.
pub struct EncryptionSession {
    metadata: Metadata,
    attached: AttachedCipher,
    deterministic: DeterministicCipher,
    transformer: Arc<VectorTransformer>,
    queries: QueryVectorGenerator,
}

impl EncryptionSession {
    pub fn new(store: Arc<SecretStore>, metadata: Metadata) -> Self {
        let transformer = Arc::new(VectorTransformer::new(Arc::clone(&store)));
        Self {
            metadata,
            attached: AttachedCipher::new(Arc::clone(&store)),
            deterministic: DeterministicCipher::new(Arc::clone(&store)),
            queries: QueryVectorGenerator::new(Arc::clone(&store), Arc::clone(&transformer)),
            transformer,
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Authenticated encryption of one text payload.
    pub fn encrypt_text(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.attached.encrypt(plaintext, &self.metadata)
    }

    /// Decrypts one text payload encrypted under this session's context.
    pub fn decrypt_text(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        self.attached.decrypt(ciphertext, &self.metadata)
    }

    /// Deterministic encryption for exact-match-filterable fields.
    pub fn encrypt_exact_match(&self, plaintext: &[u8], secret_path: &str) -> CryptoResult<Vec<u8>> {
        self.deterministic.encrypt(plaintext, secret_path, &self.metadata)
    }

    pub fn decrypt_exact_match(
        &self,
        ciphertext: &[u8],
        secret_path: &str,
    ) -> CryptoResult<Vec<u8>> {
        self.deterministic.decrypt(ciphertext, secret_path, &self.metadata)
    }

    /// Keyed transform of one embedding vector.
    pub fn encrypt_vector(&self, vector: &PlaintextVector) -> CryptoResult<EncryptedVector> {
        self.transformer.encrypt(vector, &self.metadata)
    }

    /// Encrypts all fields of a document: attached cipher for text fields,
    /// vector transform for embedding fields.
    pub fn encrypt_document(&self, fields: DocumentFields) -> CryptoResult<EncryptedDocumentFields> {
        let mut out = EncryptedDocumentFields::default();
        for (name, plaintext) in fields.text {
            out.text.insert(name, self.encrypt_text(&plaintext)?);
        }
        for (name, vector) in fields.vectors {
            out.vectors.insert(name, self.encrypt_vector(&vector)?);
        }
        Ok(out)
    }

    /// Decrypts the text fields of a document. Vector fields have no
    /// decryption — queries re-derive ciphertext vectors instead.
    pub fn decrypt_document(
        &self,
        text_fields: HashMap<String, Vec<u8>>,
    ) -> CryptoResult<HashMap<String, Vec<u8>>> {
        let mut out = HashMap::with_capacity(text_fields.len());
        for (name, ciphertext) in text_fields {
            out.insert(name, self.decrypt_text(&ciphertext)?);
        }
        Ok(out)
    }

    /// Transforms labeled query vectors under every active key version
    /// (rotation fan-out), current version first.
    pub fn prepare_query(
        &self,
        queries: HashMap<String, PlaintextVector>,
    ) -> CryptoResult<HashMap<String, Vec<EncryptedVector>>> {
        self.queries.generate_query_vectors(queries, &self.metadata)
    }
}
