//! Column store client: the seam between the grain store and the actual
//! CQL-speaking driver.
//!
//! The store only needs a narrow slice of a column store: point reads and
//! unconditional writes at a selectable consistency level, the two
//! conditional primitives CAS correctness rests on ("insert if not exists"
//! and "update if version matches", both executed at serial consistency by
//! contract), and idempotent keyspace/table DDL for bootstrap. Real
//! deployments implement [`ColumnClient`] over a driver; tests use
//! [`InMemoryColumnClient`].

mod client;
mod in_memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::row::GrainStateRow;

/// Consistency level for an issued statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consistency {
    One,
    Quorum,
    All,
    /// Linearizable level, required for conditional (CAS) statements.
    Serial,
}

/// Outcome of a conditional statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome {
    /// The condition held and the write was applied.
    Applied,
    /// The condition failed. Carries the row the store reported as current,
    /// when the driver returned one.
    Rejected { current: Option<GrainStateRow> },
}

/// Error type for column store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CqlError {
    /// Transport, timeout, or protocol-level driver failure.
    Driver(String),
    /// The session has already been closed.
    SessionClosed,
}

impl fmt::Display for CqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlError::Driver(msg) => write!(f, "driver error: {}", msg),
            CqlError::SessionClosed => write!(f, "session is closed"),
        }
    }
}

impl std::error::Error for CqlError {}

pub use client::ColumnClient;
pub use in_memory::InMemoryColumnClient;
