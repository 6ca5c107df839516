use async_trait::async_trait;

use super::{CasOutcome, Consistency, CqlError};
use crate::row::GrainStateRow;

/// Async client for the subset of a CQL column store the grain store uses.
///
/// All row operations address the `(id, grain_type)` partition key. The two
/// conditional primitives run at serial consistency by contract and report
/// applied/rejected rather than failing on a lost race; every other operation
/// takes the consistency level chosen by the store's routing policy.
#[async_trait]
pub trait ColumnClient: Send + Sync {
    /// Point read of a single row. Returns `None` when the row is absent.
    async fn select_row(
        &self,
        table: &str,
        id: &str,
        grain_type: &str,
        consistency: Consistency,
    ) -> Result<Option<GrainStateRow>, CqlError>;

    /// Unconditional insert-or-update of a row.
    async fn upsert_row(
        &self,
        table: &str,
        row: &GrainStateRow,
        consistency: Consistency,
    ) -> Result<(), CqlError>;

    /// Unconditional delete. Deleting an absent row is not an error.
    async fn delete_row(
        &self,
        table: &str,
        id: &str,
        grain_type: &str,
        consistency: Consistency,
    ) -> Result<(), CqlError>;

    /// `INSERT ... IF NOT EXISTS`: first-writer-wins on row creation.
    async fn insert_if_not_exists(
        &self,
        table: &str,
        row: &GrainStateRow,
    ) -> Result<CasOutcome, CqlError>;

    /// `UPDATE ... IF version = ?`: applied only when the stored version
    /// still equals `expected_version`.
    async fn update_if_version(
        &self,
        table: &str,
        row: &GrainStateRow,
        expected_version: &str,
    ) -> Result<CasOutcome, CqlError>;

    /// Whether the keyspace already exists, per the store's own metadata.
    async fn keyspace_exists(&self, keyspace: &str) -> Result<bool, CqlError>;

    /// Create the keyspace with simple replication at the given factor.
    async fn create_keyspace(&self, keyspace: &str, replication_factor: u32)
        -> Result<(), CqlError>;

    /// Whether the table already exists in the session's keyspace.
    async fn table_exists(&self, table: &str) -> Result<bool, CqlError>;

    /// Create the grain-state table, partitioned by `(id, grain_type)` with
    /// text `state` and `version` columns.
    async fn create_table(&self, table: &str) -> Result<(), CqlError>;

    /// Release the session. Further operations fail with `SessionClosed`.
    async fn close(&self) -> Result<(), CqlError>;
}
