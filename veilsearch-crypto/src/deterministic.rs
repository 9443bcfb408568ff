//! Deterministic encryption for exact-match-searchable fields.
//!
//! SIV-style construction: the nonce is a keyed MAC over the associated
//! data and plaintext, so the same plaintext under the same path and
//! context always yields the same ciphertext. That lets the external index
//! filter on ciphertext equality (e.g. a category field) without learning
//! the plaintext. Per-path secrets, same self-describing wire format as
//! the attached cipher.

use crate::error::{CryptoError, CryptoResult};
use crate::metadata::Metadata;
use crate::secret::{Secret, SecretStore};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use std::sync::Arc;

use crate::attached::{NONCE_SIZE, TAG_SIZE};

const VERSION_SIZE: usize = 4;
const HEADER_SIZE: usize = VERSION_SIZE + NONCE_SIZE;

const DETERMINISTIC_KEY_LABEL: &[u8] = b"veilsearch/deterministic/key";
const DETERMINISTIC_SIV_LABEL: &[u8] = b"veilsearch/deterministic/siv";

/// Deterministic cipher for fields queried by exact match.
pub struct DeterministicCipher {
    store: Arc<SecretStore>,
}

impl DeterministicCipher {
    pub fn new(store: Arc<SecretStore>) -> Self {
        Self { store }
    }

    /// Encrypts deterministically under the path's current secret.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        secret_path: &str,
        metadata: &Metadata,
    ) -> CryptoResult<Vec<u8>> {
        let secret = self.store.deterministic_secret(secret_path)?.current();
        let aad = metadata.associated_data();
        let nonce_bytes = synthetic_nonce(secret, secret_path, &aad, plaintext);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher = self.cipher_for(secret, secret_path);
        let ciphertext = cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::Encryption("deterministic encrypt failed".to_string()))?;

        let mut out = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        out.extend_from_slice(&secret.version().to_be_bytes());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypts a deterministic ciphertext produced under any active
    /// generation of the path's secret.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        secret_path: &str,
        metadata: &Metadata,
    ) -> CryptoResult<Vec<u8>> {
        if ciphertext.len() < HEADER_SIZE + TAG_SIZE {
            return Err(CryptoError::MalformedCiphertext);
        }
        let version = u32::from_be_bytes(
            ciphertext[..VERSION_SIZE]
                .try_into()
                .map_err(|_| CryptoError::MalformedCiphertext)?,
        );
        let rotatable = self.store.deterministic_secret(secret_path)?;
        let secret = rotatable
            .by_version(version)
            .ok_or(CryptoError::UnknownKeyVersion(version))?;

        let nonce = Nonce::from_slice(&ciphertext[VERSION_SIZE..HEADER_SIZE]);
        let aad = metadata.associated_data();
        self.cipher_for(secret, secret_path)
            .decrypt(
                nonce,
                Payload {
                    msg: &ciphertext[HEADER_SIZE..],
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::AuthenticationFailure)
    }

    fn cipher_for(&self, secret: &Secret, secret_path: &str) -> ChaCha20Poly1305 {
        let key = secret.subkey(DETERMINISTIC_KEY_LABEL, &[secret_path.as_bytes()]);
        ChaCha20Poly1305::new(Key::from_slice(&key))
    }
}

/// Keyed MAC over context and plaintext, truncated to nonce size.
fn synthetic_nonce(
    secret: &Secret,
    secret_path: &str,
    aad: &[u8],
    plaintext: &[u8],
) -> [u8; NONCE_SIZE] {
    let digest = secret.subkey(
        DETERMINISTIC_SIV_LABEL,
        &[secret_path.as_bytes(), aad, plaintext],
    );
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&digest[..NONCE_SIZE]);
    nonce
}
