//! Document batch hand-off format.
//!
//! The ingestion side produces an ordered batch of [`IndexDocument`]s that
//! can be persisted to disk (JSON) between the encrypt step and the index
//! upload step. Ciphertext byte fields travel base64-encoded so the batch
//! stays printable; vector fields round-trip as plain float arrays.

use crate::error::PipelineResult;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Plaintext source document prior to embedding and encryption.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
}

/// One encrypted record ready for index upload.
///
/// `title` and `content` are base64-encoded attached ciphertext; the vector
/// fields are ciphertext vectors with the source dimensionality preserved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(rename = "titleVector")]
    pub title_vector: Vec<f32>,
    #[serde(rename = "contentVector")]
    pub content_vector: Vec<f32>,
}

/// Encodes ciphertext bytes for a printable transport field.
pub fn encode_field(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a printable transport field back to ciphertext bytes.
pub fn decode_field(field: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(field)
}

/// Persists a batch as JSON (the hand-off between ingestion and indexing).
pub fn save_batch(path: impl AsRef<Path>, batch: &[IndexDocument]) -> PipelineResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, batch)?;
    writer.flush()?;
    Ok(())
}

/// Loads a previously persisted batch.
pub fn load_batch(path: impl AsRef<Path>) -> PipelineResult<Vec<IndexDocument>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
