//! The persisted record shape and the caller-facing read result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One persisted grain-state row.
///
/// `(id, grain_type)` together form the full partition key: one row per
/// (grain, type) pair, never moved to a different partition in place.
/// `version` is a stringified non-negative integer for concurrency-controlled
/// types and carries no meaning for plain types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrainStateRow {
    pub id: String,
    pub grain_type: String,
    pub state: String,
    pub version: String,
}

/// Result of a successful read: the decoded value plus the version token the
/// caller should hand back on its next write. Plain (non-concurrency
/// controlled) types always report an empty version.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedState {
    pub state: Value,
    pub version: String,
}

/// Parse a stored version token. Missing or unparsable tokens are treated as
/// zero, matching the first-write baseline.
pub(crate) fn parse_version(version: &str) -> u64 {
    version.trim().parse().unwrap_or(0)
}
