//! The versioned grain state store.
//!
//! `GrainStorage` implements the read/modify/write protocol over a
//! [`ColumnClient`]: every write re-reads the current row to establish a
//! baseline, then issues either a conditional statement (for grain types the
//! [`ConcurrencyRegistry`] marks as concurrency-controlled) or a plain
//! last-writer-wins upsert. Mutual exclusion for controlled types comes
//! entirely from the column store's CAS primitive; the store holds no
//! per-grain locks, which is what keeps it correct across processes.
//!
//! Consistency routing: statements on controlled types always run at
//! `Serial`; everything else uses the configured default, after the
//! replication-factor downgrade rule in
//! [`CqlStorageOptions::effective_default_consistency`].

use tracing::warn;

use crate::codec::StateCodec;
use crate::concurrency::ConcurrencyRegistry;
use crate::cql::{CasOutcome, ColumnClient, Consistency, CqlError};
use crate::error::StorageError;
use crate::grain_ref::{storage_key, GrainRef};
use crate::options::CqlStorageOptions;
use crate::row::{parse_version, GrainStateRow, VersionedState};
use crate::schema::ProvisionedSession;

/// Grain state store over a provisioned column store session.
pub struct GrainStorage<C: ColumnClient, S: StateCodec> {
    session: ProvisionedSession<C>,
    registry: ConcurrencyRegistry,
    codec: S,
    service_id: String,
    delete_state_on_clear: bool,
    default_consistency: Consistency,
}

impl<C: ColumnClient, S: StateCodec> GrainStorage<C, S> {
    /// Build a store from an already-provisioned session.
    ///
    /// Provisioning is a separate step (see [`crate::schema::provision`]), so
    /// a store can only exist once its keyspace and table do.
    pub fn new(
        session: ProvisionedSession<C>,
        options: &CqlStorageOptions,
        registry: ConcurrencyRegistry,
        codec: S,
    ) -> Self {
        GrainStorage {
            session,
            registry,
            codec,
            service_id: options.service_id.clone(),
            delete_state_on_clear: options.delete_state_on_clear,
            default_consistency: options.effective_default_consistency(),
        }
    }

    /// Read a grain's state. `Ok(None)` when no row exists.
    ///
    /// For concurrency-controlled types the reported version is the stored
    /// token; for plain types it is always empty, even if a stray version
    /// string exists on disk.
    pub async fn read_state(
        &self,
        grain_type: &str,
        grain_ref: &GrainRef,
    ) -> Result<Option<VersionedState>, StorageError> {
        let id = storage_key(&self.service_id, grain_ref);
        let row = self.fetch_row(grain_type, &id).await?;
        match row {
            None => Ok(None),
            Some(row) => {
                let state = self.codec.decode(&row.state)?;
                let version = if self.registry.is_concurrency_controlled(grain_type) {
                    row.version
                } else {
                    String::new()
                };
                Ok(Some(VersionedState { state, version }))
            }
        }
    }

    /// Write a grain's state, returning the new version token.
    ///
    /// `observed_version` is the token the caller last read. For
    /// concurrency-controlled types the write succeeds only if the stored
    /// version still equals it (or the row does not exist yet, in which case
    /// the first write lands at version `"0"`); otherwise
    /// [`StorageError::Conflict`] is returned and nothing is overwritten.
    /// Plain types write unconditionally and always return an empty token.
    pub async fn write_state(
        &self,
        grain_type: &str,
        grain_ref: &GrainRef,
        state: &serde_json::Value,
        observed_version: &str,
    ) -> Result<String, StorageError> {
        let id = storage_key(&self.service_id, grain_ref);
        // Baseline read; the conditional statement below re-validates it.
        let current = self.fetch_row(grain_type, &id).await?;
        let encoded = self.codec.encode(grain_type, state)?;

        if self.registry.is_concurrency_controlled(grain_type) {
            self.write_versioned(grain_type, &id, encoded, observed_version, current)
                .await
        } else {
            self.write_plain(grain_type, &id, encoded).await
        }
    }

    /// Clear a grain's state.
    ///
    /// In delete mode the row is removed outright and an empty token is
    /// returned; deletion is not versioned. Otherwise the caller's current
    /// value is re-persisted under the exact write rules above, conflict
    /// detection included; clearing an absent row is then simply a first
    /// write, not an error.
    pub async fn clear_state(
        &self,
        grain_type: &str,
        grain_ref: &GrainRef,
        state: &serde_json::Value,
        observed_version: &str,
    ) -> Result<String, StorageError> {
        if !self.delete_state_on_clear {
            return self
                .write_state(grain_type, grain_ref, state, observed_version)
                .await;
        }

        let id = storage_key(&self.service_id, grain_ref);
        self.session
            .client()
            .delete_row(
                self.session.table(),
                &id,
                grain_type,
                self.consistency_for(grain_type),
            )
            .await
            .map_err(|e| self.driver_error("clearing", &id, e))?;
        Ok(String::new())
    }

    /// Release the underlying session. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), StorageError> {
        self.session.close().await
    }

    async fn write_versioned(
        &self,
        grain_type: &str,
        id: &str,
        encoded: String,
        observed_version: &str,
        current: Option<GrainStateRow>,
    ) -> Result<String, StorageError> {
        let client = self.session.client();
        let table = self.session.table();

        if current.is_none() {
            // First write: first-writer-wins on creation.
            let row = GrainStateRow {
                id: id.to_string(),
                grain_type: grain_type.to_string(),
                state: encoded,
                version: "0".to_string(),
            };
            let outcome = client
                .insert_if_not_exists(table, &row)
                .await
                .map_err(|e| self.driver_error("creating", id, e))?;
            return match outcome {
                CasOutcome::Applied => Ok(row.version),
                CasOutcome::Rejected { current } => {
                    Err(self.conflict(id, observed_version, current))
                }
            };
        }

        let observed = parse_version(observed_version);
        // The token is caller-supplied; saturate so an absurd value still
        // falls through to the version condition and loses there.
        let next = observed.saturating_add(1);
        let row = GrainStateRow {
            id: id.to_string(),
            grain_type: grain_type.to_string(),
            state: encoded,
            version: next.to_string(),
        };
        let outcome = client
            .update_if_version(table, &row, &observed.to_string())
            .await
            .map_err(|e| self.driver_error("writing", id, e))?;
        match outcome {
            CasOutcome::Applied => Ok(row.version),
            CasOutcome::Rejected { current } => Err(self.conflict(id, observed_version, current)),
        }
    }

    async fn write_plain(
        &self,
        grain_type: &str,
        id: &str,
        encoded: String,
    ) -> Result<String, StorageError> {
        // CQL upserts, so one statement covers both the absent and present
        // row cases. The version column stays empty: plain rows are
        // versionless from the caller's perspective.
        let row = GrainStateRow {
            id: id.to_string(),
            grain_type: grain_type.to_string(),
            state: encoded,
            version: String::new(),
        };
        self.session
            .client()
            .upsert_row(self.session.table(), &row, self.default_consistency)
            .await
            .map_err(|e| self.driver_error("writing", id, e))?;
        Ok(String::new())
    }

    async fn fetch_row(
        &self,
        grain_type: &str,
        id: &str,
    ) -> Result<Option<GrainStateRow>, StorageError> {
        self.session
            .client()
            .select_row(
                self.session.table(),
                id,
                grain_type,
                self.consistency_for(grain_type),
            )
            .await
            .map_err(|e| self.driver_error("reading", id, e))
    }

    fn consistency_for(&self, grain_type: &str) -> Consistency {
        if self.registry.is_concurrency_controlled(grain_type) {
            Consistency::Serial
        } else {
            self.default_consistency
        }
    }

    fn conflict(
        &self,
        id: &str,
        observed_version: &str,
        current: Option<GrainStateRow>,
    ) -> StorageError {
        StorageError::Conflict {
            grain_id: id.to_string(),
            attempted: observed_version.to_string(),
            current: current.map(|row| row.version).unwrap_or_default(),
        }
    }

    fn driver_error(&self, operation: &str, id: &str, err: CqlError) -> StorageError {
        warn!(
            grain_id = %id,
            error = %err,
            "column store driver error while {} grain state",
            operation
        );
        StorageError::Driver(err.to_string())
    }
}
