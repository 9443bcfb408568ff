//! Authenticated encryption for attached document content.
//!
//! ChaCha20-Poly1305 with the request metadata bound as associated data.
//! The ciphertext is self-describing: a 4-byte big-endian key version and
//! the 12-byte nonce are prepended, so decryption needs no bookkeeping
//! beyond the secret store itself.

use crate::error::{CryptoError, CryptoResult};
use crate::metadata::Metadata;
use crate::secret::SecretStore;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use std::sync::Arc;

/// ChaCha20-Poly1305 nonce length in bytes.
pub const NONCE_SIZE: usize = 12;
/// Poly1305 authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

const VERSION_SIZE: usize = 4;
const HEADER_SIZE: usize = VERSION_SIZE + NONCE_SIZE;

const ATTACHED_KEY_LABEL: &[u8] = b"veilsearch/attached/key";

/// Authenticated cipher for whole-document byte payloads (titles, bodies).
pub struct AttachedCipher {
    store: Arc<SecretStore>,
}

impl AttachedCipher {
    pub fn new(store: Arc<SecretStore>) -> Self {
        Self { store }
    }

    /// Encrypts a payload under the current standard secret, binding the
    /// metadata as associated data.
    pub fn encrypt(&self, plaintext: &[u8], metadata: &Metadata) -> CryptoResult<Vec<u8>> {
        let secret = self.store.standard_current();
        let key = secret.subkey(ATTACHED_KEY_LABEL, &[]);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));

        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let aad = metadata.associated_data();
        let ciphertext = cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::Encryption("attached encrypt failed".to_string()))?;

        let mut out = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        out.extend_from_slice(&secret.version().to_be_bytes());
        out.extend_from_slice(nonce.as_slice());
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypts a payload, resolving the key version embedded in the header.
    ///
    /// Fails with `UnknownKeyVersion` if the embedded version is no longer
    /// in the store, and `AuthenticationFailure` on tag or context mismatch.
    pub fn decrypt(&self, ciphertext: &[u8], metadata: &Metadata) -> CryptoResult<Vec<u8>> {
        let (secret, nonce, body) = parse_header(&self.store, ciphertext)?;
        let key = secret.subkey(ATTACHED_KEY_LABEL, &[]);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));

        let aad = metadata.associated_data();
        cipher
            .decrypt(
                nonce,
                Payload {
                    msg: body,
                    aad: &aad,
                },
            )
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

/// Splits `version || nonce || body` and resolves the standard secret.
fn parse_header<'a, 'b>(
    store: &'a SecretStore,
    ciphertext: &'b [u8],
) -> CryptoResult<(&'a crate::secret::Secret, &'b Nonce, &'b [u8])> {
    if ciphertext.len() < HEADER_SIZE + TAG_SIZE {
        return Err(CryptoError::MalformedCiphertext);
    }
    let version = u32::from_be_bytes(
        ciphertext[..VERSION_SIZE]
            .try_into()
            .map_err(|_| CryptoError::MalformedCiphertext)?,
    );
    let secret = store.standard_secret(version)?;
    let nonce = Nonce::from_slice(&ciphertext[VERSION_SIZE..HEADER_SIZE]);
    Ok((secret, nonce, &ciphertext[HEADER_SIZE..]))
}
