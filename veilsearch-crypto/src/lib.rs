//! Searchable encryption core for veilsearch.
//!
//! Lets embedding vectors and their text payloads live in a third-party
//! search index without the index operator ever seeing plaintext, while
//! keeping approximate nearest-neighbor search working over the ciphertext.
//!
//! # Architecture
//!
//! - **`SecretStore`**: versioned symmetric secrets per secret path,
//!   immutable after construction. Rotation swaps the store wholesale.
//! - **`AttachedCipher`**: ChaCha20-Poly1305 for titles and bodies, with
//!   the tenant context bound as associated data and a self-describing
//!   key-version + nonce header.
//! - **`DeterministicCipher`**: SIV-style deterministic encryption for
//!   fields filtered by exact match on ciphertext.
//! - **`VectorTransformer`**: keyed pseudorandom orthogonal map plus
//!   factor-scaled bounded noise. Deterministic, dimension-preserving,
//!   and approximately distance-ordering-preserving, so the external
//!   index can run k-NN over ciphertext vectors.
//! - **`QueryVectorGenerator`**: fans one logical query out across every
//!   active key generation during a rotation window.
//! - **`EncryptionSession`**: façade binding one tenant context over all
//!   of the above.
//!
//! All operations are bounded, synchronous computations with no I/O; the
//! external embedder and search index live behind the caller's own
//! interfaces.

mod attached;
mod deterministic;
mod error;
mod metadata;
mod query;
mod secret;
mod session;
mod vector;

pub use attached::{AttachedCipher, NONCE_SIZE, TAG_SIZE};
pub use deterministic::DeterministicCipher;
pub use error::{CryptoError, CryptoResult};
pub use metadata::Metadata;
pub use query::QueryVectorGenerator;
pub use secret::{
    RotatableSecret, Secret, SecretStore, StandardSecrets, VectorSecret, MIN_KEY_BYTES,
};
pub use session::{DocumentFields, EncryptedDocumentFields, EncryptionSession};
pub use vector::{EncryptedVector, PlaintextVector, VectorTransformer};
