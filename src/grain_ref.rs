//! Grain references and storage key derivation.
//!
//! A `GrainRef` is the caller-supplied, globally unique identifier of one
//! logical grain: a type name plus a key. The store never constructs one; it
//! only formats it into a storage key, namespaced by the service id so that
//! multiple services can share a keyspace without collisions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a single grain: type name + key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrainRef {
    grain_type: String,
    key: String,
}

impl GrainRef {
    pub fn new(grain_type: impl Into<String>, key: impl Into<String>) -> Self {
        GrainRef {
            grain_type: grain_type.into(),
            key: key.into(),
        }
    }

    pub fn grain_type(&self) -> &str {
        &self.grain_type
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Canonical string form, `"{grain_type}/{key}"`.
    pub fn to_key_string(&self) -> String {
        format!("{}/{}", self.grain_type, self.key)
    }
}

impl fmt::Display for GrainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.grain_type, self.key)
    }
}

/// Derive the storage key for a grain: `"{service_id}_{grain_ref}"`.
///
/// Pure and deterministic across process restarts; identical inputs always
/// produce identical keys.
pub fn storage_key(service_id: &str, grain_ref: &GrainRef) -> String {
    format!("{}_{}", service_id, grain_ref.to_key_string())
}
