//! Ingestion and query orchestration for veilsearch.
//!
//! Sits between the encryption core (`veilsearch-crypto`) and the external
//! collaborators it deliberately does not implement: the embedding service
//! and the search index, both consumed through traits here. Provides:
//!
//! - the batch hand-off format between ingestion and indexing
//!   (base64-printable ciphertext fields, plain float ciphertext vectors),
//! - `IngestPipeline`: embed, encrypt (vector + attached text joined per
//!   document), upload,
//! - `SearchPipeline`: embed the query, fan out across active key
//!   generations, merge hits client-side, decrypt.
//!
//! Retry and cancellation policy for the I/O collaborators belongs to the
//! trait implementations, not to this crate.

mod embedder;
mod error;
mod index;
mod ingest;
mod record;
mod search;

pub use embedder::Embedder;
pub use error::{PipelineError, PipelineResult};
pub use index::{IndexHit, VectorIndex};
pub use ingest::{IngestConfig, IngestPipeline};
pub use record::{decode_field, encode_field, load_batch, save_batch, IndexDocument, SourceDocument};
pub use search::{SearchConfig, SearchHit, SearchPipeline};
