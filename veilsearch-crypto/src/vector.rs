//! Keyed, deterministic vector transform for searchable embeddings.
//!
//! Embedding vectors cannot go through ordinary AEAD — the index needs
//! their geometry to answer k-nearest-neighbor queries. Instead each vector
//! is passed through a keyed pseudorandom orthogonal map (rounds of secret
//! permutations and plane rotations, plus sign flips), which preserves
//! pairwise distances exactly, then perturbed by bounded noise scaled by
//! the approximation factor. The whole result is scaled by the factor.
//!
//! The transform is deterministic: the rotation network is seeded from the
//! secret, context, paths, and key version; the noise is additionally bound
//! to the vector contents, so the same vector always produces the same
//! ciphertext (stable indexing, duplicate detection) while distinct vectors
//! receive independent noise. Ciphertext vectors are never decrypted — they
//! exist purely as index keys.

use crate::error::{CryptoError, CryptoResult};
use crate::metadata::Metadata;
use crate::secret::{Secret, SecretStore};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const ROTATION_SEED_LABEL: &[u8] = b"veilsearch/vector/rotation";
const NOISE_SEED_LABEL: &[u8] = b"veilsearch/vector/noise";

/// Rounds of permutation + plane rotation in the orthogonal network.
const ROTATION_ROUNDS: usize = 4;

/// Noise amplitude per unit of (factor - 1), as a fraction of the vector's
/// RMS component magnitude. Keeps ranking drift gradual across the typical
/// factor range [1.0, 10.0].
const NOISE_FRACTION: f32 = 0.05;

/// An embedding vector awaiting encryption, tagged with the key family and
/// derivation sub-namespace that diversify its transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaintextVector {
    pub plaintext_vector: Vec<f32>,
    pub secret_path: String,
    pub derivation_path: String,
}

impl PlaintextVector {
    pub fn new(
        plaintext_vector: Vec<f32>,
        secret_path: impl Into<String>,
        derivation_path: impl Into<String>,
    ) -> Self {
        Self {
            plaintext_vector,
            secret_path: secret_path.into(),
            derivation_path: derivation_path.into(),
        }
    }
}

/// A transformed vector, same component count as its plaintext source so
/// the index's fixed-dimension schema is satisfied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncryptedVector {
    pub encrypted_vector: Vec<f32>,
    pub secret_path: String,
    pub derivation_path: String,
}

/// Applies the keyed transform; tracks per-path dimensions to catch drift.
pub struct VectorTransformer {
    store: Arc<SecretStore>,
    dimensions: RwLock<HashMap<String, usize>>,
}

impl VectorTransformer {
    pub fn new(store: Arc<SecretStore>) -> Self {
        Self {
            store,
            dimensions: RwLock::new(HashMap::new()),
        }
    }

    /// Encrypts a vector under the current key for its secret path.
    pub fn encrypt(
        &self,
        vector: &PlaintextVector,
        metadata: &Metadata,
    ) -> CryptoResult<EncryptedVector> {
        let vector_secret = self.store.vector_secret(&vector.secret_path)?;
        self.encrypt_under(
            vector,
            metadata,
            vector_secret.rotatable().current(),
            vector_secret.approximation_factor(),
        )
    }

    /// Encrypts under a specific key generation (query fan-out during
    /// rotation uses this for each active version).
    pub(crate) fn encrypt_under(
        &self,
        vector: &PlaintextVector,
        metadata: &Metadata,
        secret: &Secret,
        factor: f32,
    ) -> CryptoResult<EncryptedVector> {
        self.check_dimension(&vector.secret_path, vector.plaintext_vector.len())?;

        let aad = metadata.associated_data();
        let seed = secret.subkey(
            ROTATION_SEED_LABEL,
            &[
                &aad,
                vector.secret_path.as_bytes(),
                vector.derivation_path.as_bytes(),
                &secret.version().to_be_bytes(),
            ],
        );

        let mut out = vector.plaintext_vector.clone();
        let mut rng = ChaCha20Rng::from_seed(seed);
        apply_orthogonal(&mut rng, &mut out);

        let amplitude = (factor - 1.0).max(0.0) * NOISE_FRACTION * rms(&vector.plaintext_vector);
        if amplitude > 0.0 {
            let noise_seed = secret.subkey(
                NOISE_SEED_LABEL,
                &[
                    &aad,
                    vector.secret_path.as_bytes(),
                    vector.derivation_path.as_bytes(),
                    &component_bytes(&vector.plaintext_vector),
                ],
            );
            let mut noise_rng = ChaCha20Rng::from_seed(noise_seed);
            for component in &mut out {
                *component += amplitude * signed_unit(&mut noise_rng);
            }
        }

        for component in &mut out {
            *component *= factor;
        }

        Ok(EncryptedVector {
            encrypted_vector: out,
            secret_path: vector.secret_path.clone(),
            derivation_path: vector.derivation_path.clone(),
        })
    }

    /// Rejects empty vectors and dimensions that drift from the first one
    /// seen under a secret path.
    fn check_dimension(&self, secret_path: &str, len: usize) -> CryptoResult<()> {
        let mut dims = self
            .dimensions
            .write()
            .map_err(|e| CryptoError::Encryption(format!("dimension registry poisoned: {e}")))?;
        if len == 0 {
            return Err(CryptoError::DimensionMismatch {
                path: secret_path.to_string(),
                expected: dims.get(secret_path).copied().unwrap_or(0),
                actual: 0,
            });
        }
        match dims.entry(secret_path.to_string()) {
            Entry::Occupied(entry) => {
                let expected = *entry.get();
                if expected != len {
                    return Err(CryptoError::DimensionMismatch {
                        path: secret_path.to_string(),
                        expected,
                        actual: len,
                    });
                }
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(len);
                Ok(())
            }
        }
    }
}

/// Keyed orthogonal map: rounds of secret permutation + Givens rotations on
/// adjacent pairs, then sign flips. Composition of orthogonal operations,
/// so pairwise distances are preserved exactly.
fn apply_orthogonal(rng: &mut ChaCha20Rng, v: &mut [f32]) {
    let d = v.len();
    let mut perm: Vec<usize> = (0..d).collect();
    let mut scratch = vec![0.0f32; d];

    for _ in 0..ROTATION_ROUNDS {
        shuffle(rng, &mut perm);
        for (dst, &src) in perm.iter().enumerate() {
            scratch[dst] = v[src];
        }
        v.copy_from_slice(&scratch);

        for pair in v.chunks_exact_mut(2) {
            let theta = std::f32::consts::TAU * unit(rng);
            let (sin, cos) = theta.sin_cos();
            let (a, b) = (pair[0], pair[1]);
            pair[0] = cos * a - sin * b;
            pair[1] = sin * a + cos * b;
        }
    }

    for component in v.iter_mut() {
        if rng.next_u32() & 1 == 1 {
            *component = -*component;
        }
    }
}

/// Fisher-Yates driven directly by the stream cipher output.
fn shuffle(rng: &mut ChaCha20Rng, perm: &mut [usize]) {
    for i in (1..perm.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        perm.swap(i, j);
    }
}

/// Uniform in [0, 1) with full 24-bit float resolution.
fn unit(rng: &mut ChaCha20Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1u32 << 24) as f32
}

/// Uniform in [-1, 1).
fn signed_unit(rng: &mut ChaCha20Rng) -> f32 {
    2.0 * unit(rng) - 1.0
}

fn rms(v: &[f32]) -> f32 {
    let sum: f64 = v.iter().map(|&c| (c as f64) * (c as f64)).sum();
    ((sum / v.len() as f64).sqrt()) as f32
}

fn component_bytes(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for component in v {
        out.extend_from_slice(&component.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_map_preserves_norm() {
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        let original: Vec<f32> = (0..128).map(|i| (i as f32 * 0.37).sin()).collect();
        let mut transformed = original.clone();
        apply_orthogonal(&mut rng, &mut transformed);

        let norm_in: f64 = original.iter().map(|&c| (c as f64).powi(2)).sum();
        let norm_out: f64 = transformed.iter().map(|&c| (c as f64).powi(2)).sum();
        assert!((norm_in - norm_out).abs() < 1e-3 * norm_in);
        assert_ne!(original, transformed);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let mut perm: Vec<usize> = (0..100).collect();
        shuffle(&mut rng, &mut perm);
        let mut sorted = perm.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn unit_stays_in_range() {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        for _ in 0..10_000 {
            let x = unit(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }
}
