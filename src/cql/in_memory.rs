//! In-memory column client for testing and development.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{CasOutcome, ColumnClient, Consistency, CqlError};
use crate::row::GrainStateRow;

/// Row key inside a table: `(table, id, grain_type)`.
type RowKey = (String, String, String);

#[derive(Default)]
struct Inner {
    keyspaces: HashMap<String, u32>,
    tables: HashSet<String>,
    rows: HashMap<RowKey, GrainStateRow>,
    closed: bool,
    fail_next: Option<String>,
    last_consistency: Option<Consistency>,
    create_keyspace_calls: u32,
    create_table_calls: u32,
}

impl Inner {
    fn check_usable(&mut self) -> Result<(), CqlError> {
        if self.closed {
            return Err(CqlError::SessionClosed);
        }
        if let Some(msg) = self.fail_next.take() {
            return Err(CqlError::Driver(msg));
        }
        Ok(())
    }
}

/// HashMap-backed column client. Clone-friendly via `Arc`.
///
/// Besides the `ColumnClient` contract it exposes a few inspection hooks used
/// by tests: the consistency level of the last row statement, DDL call
/// counters, and one-shot fault injection.
#[derive(Clone, Default)]
pub struct InMemoryColumnClient {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryColumnClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // In-memory state only; a poisoned mutex means a test already panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next operation fail with a driver error.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().fail_next = Some(message.into());
    }

    /// Consistency level of the most recent row statement.
    pub fn last_consistency(&self) -> Option<Consistency> {
        self.lock().last_consistency
    }

    /// Number of `create_keyspace` calls observed.
    pub fn create_keyspace_calls(&self) -> u32 {
        self.lock().create_keyspace_calls
    }

    /// Number of `create_table` calls observed.
    pub fn create_table_calls(&self) -> u32 {
        self.lock().create_table_calls
    }

    /// Raw stored row, bypassing the store's version reporting rules.
    pub fn raw_row(&self, table: &str, id: &str, grain_type: &str) -> Option<GrainStateRow> {
        self.lock()
            .rows
            .get(&(table.to_string(), id.to_string(), grain_type.to_string()))
            .cloned()
    }

    /// Insert a row directly, bypassing the store. Used to seed test fixtures.
    pub fn seed_row(&self, table: &str, row: GrainStateRow) {
        self.lock().rows.insert(
            (table.to_string(), row.id.clone(), row.grain_type.clone()),
            row,
        );
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

fn row_key(table: &str, id: &str, grain_type: &str) -> RowKey {
    (table.to_string(), id.to_string(), grain_type.to_string())
}

#[async_trait]
impl ColumnClient for InMemoryColumnClient {
    async fn select_row(
        &self,
        table: &str,
        id: &str,
        grain_type: &str,
        consistency: Consistency,
    ) -> Result<Option<GrainStateRow>, CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.last_consistency = Some(consistency);
        Ok(inner.rows.get(&row_key(table, id, grain_type)).cloned())
    }

    async fn upsert_row(
        &self,
        table: &str,
        row: &GrainStateRow,
        consistency: Consistency,
    ) -> Result<(), CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.last_consistency = Some(consistency);
        inner
            .rows
            .insert(row_key(table, &row.id, &row.grain_type), row.clone());
        Ok(())
    }

    async fn delete_row(
        &self,
        table: &str,
        id: &str,
        grain_type: &str,
        consistency: Consistency,
    ) -> Result<(), CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.last_consistency = Some(consistency);
        inner.rows.remove(&row_key(table, id, grain_type));
        Ok(())
    }

    async fn insert_if_not_exists(
        &self,
        table: &str,
        row: &GrainStateRow,
    ) -> Result<CasOutcome, CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.last_consistency = Some(Consistency::Serial);
        let key = row_key(table, &row.id, &row.grain_type);
        match inner.rows.get(&key) {
            Some(existing) => Ok(CasOutcome::Rejected {
                current: Some(existing.clone()),
            }),
            None => {
                inner.rows.insert(key, row.clone());
                Ok(CasOutcome::Applied)
            }
        }
    }

    async fn update_if_version(
        &self,
        table: &str,
        row: &GrainStateRow,
        expected_version: &str,
    ) -> Result<CasOutcome, CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.last_consistency = Some(Consistency::Serial);
        let key = row_key(table, &row.id, &row.grain_type);
        match inner.rows.get_mut(&key) {
            Some(existing) if existing.version == expected_version => {
                existing.state = row.state.clone();
                existing.version = row.version.clone();
                Ok(CasOutcome::Applied)
            }
            Some(existing) => Ok(CasOutcome::Rejected {
                current: Some(existing.clone()),
            }),
            None => Ok(CasOutcome::Rejected { current: None }),
        }
    }

    async fn keyspace_exists(&self, keyspace: &str) -> Result<bool, CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        Ok(inner.keyspaces.contains_key(keyspace))
    }

    async fn create_keyspace(
        &self,
        keyspace: &str,
        replication_factor: u32,
    ) -> Result<(), CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.create_keyspace_calls += 1;
        inner.keyspaces.insert(keyspace.to_string(), replication_factor);
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> Result<bool, CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        Ok(inner.tables.contains(table))
    }

    async fn create_table(&self, table: &str) -> Result<(), CqlError> {
        let mut inner = self.lock();
        inner.check_usable()?;
        inner.create_table_calls += 1;
        inner.tables.insert(table.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), CqlError> {
        self.lock().closed = true;
        Ok(())
    }
}
