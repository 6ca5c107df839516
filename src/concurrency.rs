//! Concurrency classification of grain types.
//!
//! The registry decides, per grain-type tag, whether writes go through the
//! linearizable compare-and-swap path or plain last-writer-wins. Membership
//! is an explicit set of string tags supplied at configuration time; there is
//! no structural inspection of values.
//!
//! The default registry is empty: every type is last-writer-wins until the
//! deployment registers it. Strict CAS semantics cost a serial-consistency
//! round trip per statement, so they are opt-in per type.

use std::collections::HashSet;

/// Registry of grain-type tags that participate in optimistic concurrency
/// control.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyRegistry {
    tags: HashSet<String>,
}

impl ConcurrencyRegistry {
    /// Build a registry from an explicit set of grain-type tags.
    pub fn new<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        ConcurrencyRegistry {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Register an additional grain-type tag.
    pub fn register(&mut self, grain_type: impl Into<String>) {
        self.tags.insert(grain_type.into());
    }

    /// Whether the given grain-type tag uses the CAS write path.
    pub fn is_concurrency_controlled(&self, grain_type: &str) -> bool {
        self.tags.contains(grain_type)
    }
}
