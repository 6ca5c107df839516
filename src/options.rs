//! Configuration surface for the grain store.

use serde::{Deserialize, Serialize};

use crate::codec::JsonCodecOptions;
use crate::cql::Consistency;

/// Deployment-wide options for one grain store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CqlStorageOptions {
    /// Column store contact points, consumed by the client implementation
    /// when it opens its session.
    pub contact_points: Vec<String>,
    /// Service identifier used to namespace storage keys, so multiple
    /// services can share one keyspace.
    pub service_id: String,
    pub keyspace: String,
    pub table_name: String,
    pub replication_factor: u32,
    /// Clear mode: delete the row outright, or re-persist the current value
    /// under the normal write rules (the default).
    pub delete_state_on_clear: bool,
    /// Consistency level for statements on non-concurrency-controlled types.
    /// Concurrency-controlled types always run at `Serial`.
    pub default_consistency: Consistency,
    /// When `replication_factor` falls below this threshold the default
    /// consistency is lowered to `One`: quorum-strength levels cannot be
    /// satisfied without enough replicas to form a quorum.
    pub consistency_downgrade_threshold: u32,
    pub codec: JsonCodecOptions,
}

impl Default for CqlStorageOptions {
    fn default() -> Self {
        CqlStorageOptions {
            contact_points: Vec::new(),
            service_id: "service".to_string(),
            keyspace: "grains".to_string(),
            table_name: "grain_state".to_string(),
            replication_factor: 3,
            delete_state_on_clear: false,
            default_consistency: Consistency::Quorum,
            consistency_downgrade_threshold: 3,
            codec: JsonCodecOptions::default(),
        }
    }
}

impl CqlStorageOptions {
    /// The default consistency after the replication-factor downgrade rule.
    pub fn effective_default_consistency(&self) -> Consistency {
        if self.replication_factor < self.consistency_downgrade_threshold {
            Consistency::One
        } else {
            self.default_consistency
        }
    }
}
