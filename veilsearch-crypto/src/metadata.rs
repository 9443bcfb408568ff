//! Request metadata bound into every ciphertext.
//!
//! The tenant identifier (and any finer-grained sub-context) is encoded into
//! a canonical byte string and used as associated authenticated data by both
//! ciphers, and folded into the vector transform seeds. Ciphertext produced
//! under one context can never be decrypted — or replayed — under another.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tenant-scoped context for a batch of encryption operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    tenant_id: String,
    /// Optional finer-grained context (e.g. collection or user scope).
    /// Sorted map so the associated-data encoding is canonical.
    sub_context: BTreeMap<String, String>,
}

impl Metadata {
    /// Creates metadata carrying only a tenant identifier.
    pub fn new_simple(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            sub_context: BTreeMap::new(),
        }
    }

    /// Adds a sub-context entry (builder style).
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.sub_context.insert(key.into(), value.into());
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Canonical associated-data encoding.
    ///
    /// Length-prefixed fields rather than separators, so no tenant or
    /// sub-context value can collide with another encoding.
    pub(crate) fn associated_data(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.tenant_id.len());
        encode_field(&mut out, self.tenant_id.as_bytes());
        for (key, value) in &self.sub_context {
            encode_field(&mut out, key.as_bytes());
            encode_field(&mut out, value.as_bytes());
        }
        out
    }
}

fn encode_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u64).to_be_bytes());
    out.extend_from_slice(field);
}
