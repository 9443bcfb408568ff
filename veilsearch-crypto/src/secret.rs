//! Versioned secrets and the immutable secret store.
//!
//! Keys are supplied by the caller at construction — this crate does no
//! persistent key storage. The store is a pure lookup structure, immutable
//! after construction; key rotation is modeled as building a replacement
//! store and swapping the `Arc`, never as in-place mutation, so concurrent
//! readers never observe a torn rotation.

use crate::error::{CryptoError, CryptoResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted key material length.
pub const MIN_KEY_BYTES: usize = 32;

/// Raw symmetric key material with a positive version identifier.
///
/// Immutable once created; material is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    #[zeroize(skip)]
    version: u32,
    material: Vec<u8>,
}

impl Secret {
    pub fn new(version: u32, material: Vec<u8>) -> CryptoResult<Self> {
        if version == 0 {
            return Err(CryptoError::Configuration(
                "secret version must be a positive integer".to_string(),
            ));
        }
        if material.len() < MIN_KEY_BYTES {
            return Err(CryptoError::Configuration(format!(
                "secret material must be at least {MIN_KEY_BYTES} bytes, got {}",
                material.len()
            )));
        }
        Ok(Self { version, material })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Derives a purpose-bound 32-byte subkey from the raw material.
    ///
    /// `label` is a fixed domain string; `parts` are length-prefixed so
    /// adjacent fields cannot collide. Master material of any accepted
    /// length yields a uniform cipher- or seed-sized key.
    pub(crate) fn subkey(&self, label: &[u8], parts: &[&[u8]]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(&self.material)
            .expect("HMAC accepts keys of any length");
        mac.update(&(label.len() as u64).to_be_bytes());
        mac.update(label);
        for part in parts {
            mac.update(&(part.len() as u64).to_be_bytes());
            mac.update(part);
        }
        mac.finalize().into_bytes().into()
    }
}

/// A current secret plus an optional previous one, valid together only
/// during a rotation window.
pub struct RotatableSecret {
    current: Secret,
    previous: Option<Secret>,
}

impl RotatableSecret {
    pub fn new(current: Secret, previous: Option<Secret>) -> CryptoResult<Self> {
        if let Some(prev) = &previous {
            if prev.version() >= current.version() {
                return Err(CryptoError::Configuration(format!(
                    "previous secret version {} must be lower than current version {}",
                    prev.version(),
                    current.version()
                )));
            }
        }
        Ok(Self { current, previous })
    }

    pub fn current(&self) -> &Secret {
        &self.current
    }

    pub fn previous(&self) -> Option<&Secret> {
        self.previous.as_ref()
    }

    /// Whether a rotation window is open (both generations valid).
    pub fn in_rotation(&self) -> bool {
        self.previous.is_some()
    }

    pub(crate) fn by_version(&self, version: u32) -> Option<&Secret> {
        if self.current.version() == version {
            return Some(&self.current);
        }
        self.previous
            .as_ref()
            .filter(|prev| prev.version() == version)
    }

    /// Active version identifiers, current first.
    pub fn active_versions(&self) -> Vec<u32> {
        let mut versions = vec![self.current.version()];
        if let Some(prev) = &self.previous {
            versions.push(prev.version());
        }
        versions
    }
}

/// A rotatable secret plus the approximation factor controlling how much
/// the vector transform perturbs geometry (searchability vs. invertibility).
pub struct VectorSecret {
    approximation_factor: f32,
    secret: RotatableSecret,
}

impl VectorSecret {
    pub fn new(approximation_factor: f32, secret: RotatableSecret) -> CryptoResult<Self> {
        if !approximation_factor.is_finite() || approximation_factor <= 0.0 {
            return Err(CryptoError::Configuration(format!(
                "approximation factor must be a positive real, got {approximation_factor}"
            )));
        }
        Ok(Self {
            approximation_factor,
            secret,
        })
    }

    pub fn approximation_factor(&self) -> f32 {
        self.approximation_factor
    }

    pub fn rotatable(&self) -> &RotatableSecret {
        &self.secret
    }
}

/// Versioned secrets for the attached-data cipher, with one primary version
/// used for all new encryption.
pub struct StandardSecrets {
    primary_version: u32,
    secrets: Vec<Secret>,
}

impl StandardSecrets {
    pub fn new(primary_version: u32, secrets: Vec<Secret>) -> CryptoResult<Self> {
        if secrets.is_empty() {
            return Err(CryptoError::Configuration(
                "standard secrets must contain at least one secret".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for secret in &secrets {
            if !seen.insert(secret.version()) {
                return Err(CryptoError::Configuration(format!(
                    "duplicate standard secret version {}",
                    secret.version()
                )));
            }
        }
        if !seen.contains(&primary_version) {
            return Err(CryptoError::Configuration(format!(
                "primary version {primary_version} not present in standard secrets"
            )));
        }
        Ok(Self {
            primary_version,
            secrets,
        })
    }

    fn current(&self) -> &Secret {
        // Presence of the primary version is a construction invariant.
        self.secrets
            .iter()
            .find(|s| s.version() == self.primary_version)
            .unwrap_or(&self.secrets[0])
    }

    fn by_version(&self, version: u32) -> Option<&Secret> {
        self.secrets.iter().find(|s| s.version() == version)
    }
}

/// Immutable lookup of all key material: standard secrets for attached-data
/// encryption, plus per-path deterministic and vector secrets.
///
/// Distinct secret paths never share key material. Configuration problems
/// are fatal at construction, not deferred to first use.
pub struct SecretStore {
    standard: StandardSecrets,
    deterministic: HashMap<String, RotatableSecret>,
    vector: HashMap<String, VectorSecret>,
}

impl SecretStore {
    pub fn new(
        standard: StandardSecrets,
        deterministic: HashMap<String, RotatableSecret>,
        vector: HashMap<String, VectorSecret>,
    ) -> CryptoResult<Self> {
        for path in deterministic.keys().chain(vector.keys()) {
            if path.is_empty() {
                return Err(CryptoError::Configuration(
                    "secret path must be a non-empty string".to_string(),
                ));
            }
        }
        Ok(Self {
            standard,
            deterministic,
            vector,
        })
    }

    /// Current standard secret (used for all new attached-data encryption).
    pub fn standard_current(&self) -> &Secret {
        self.standard.current()
    }

    /// Standard secret matching an embedded ciphertext key version.
    pub fn standard_secret(&self, version: u32) -> CryptoResult<&Secret> {
        self.standard
            .by_version(version)
            .ok_or(CryptoError::UnknownKeyVersion(version))
    }

    pub fn vector_secret(&self, secret_path: &str) -> CryptoResult<&VectorSecret> {
        self.vector
            .get(secret_path)
            .ok_or_else(|| CryptoError::UnknownSecretPath(secret_path.to_string()))
    }

    pub fn deterministic_secret(&self, secret_path: &str) -> CryptoResult<&RotatableSecret> {
        self.deterministic
            .get(secret_path)
            .ok_or_else(|| CryptoError::UnknownSecretPath(secret_path.to_string()))
    }

    /// Active key versions for a vector secret path, current first, then
    /// previous if a rotation window is open.
    pub fn active_versions(&self, secret_path: &str) -> CryptoResult<Vec<u32>> {
        Ok(self.vector_secret(secret_path)?.rotatable().active_versions())
    }
}
