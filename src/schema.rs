//! Schema bootstrap: provision the keyspace and table, producing the session
//! handle the store is built from.
//!
//! Provisioning is idempotent (existence is checked before anything is
//! created) and safe to run on every process start. It is the only place the
//! cancellation token is consulted; once a statement has been dispatched it is
//! not un-sent. The store constructor requires a [`ProvisionedSession`], so an
//! unprovisioned store cannot exist.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cql::ColumnClient;
use crate::error::StorageError;
use crate::options::CqlStorageOptions;

/// A client session whose keyspace and table are known to exist.
///
/// Shared immutably across all in-flight operations and released exactly once
/// by [`close`](ProvisionedSession::close); closing twice is a no-op.
pub struct ProvisionedSession<C: ColumnClient> {
    client: C,
    table: String,
    closed: AtomicBool,
}

// Manual impl: the client itself need not be `Debug`.
impl<C: ColumnClient> fmt::Debug for ProvisionedSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionedSession")
            .field("table", &self.table)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<C: ColumnClient> ProvisionedSession<C> {
    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    /// Release the underlying session. Only the first call reaches the
    /// client; later calls return `Ok(())` without effect.
    pub async fn close(&self) -> Result<(), StorageError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client
            .close()
            .await
            .map_err(|e| StorageError::Driver(e.to_string()))
    }
}

/// Ensure the keyspace and table exist, then hand back the session.
///
/// On any failure, including cancellation, the client is closed before the
/// error is returned so no session leaks out of a failed bootstrap.
pub async fn provision<C: ColumnClient>(
    client: C,
    options: &CqlStorageOptions,
    cancel: &CancellationToken,
) -> Result<ProvisionedSession<C>, StorageError> {
    match ensure_schema(&client, options, cancel).await {
        Ok(()) => {
            info!(
                keyspace = %options.keyspace,
                table = %options.table_name,
                service_id = %options.service_id,
                "grain storage provisioned"
            );
            Ok(ProvisionedSession {
                client,
                table: options.table_name.clone(),
                closed: AtomicBool::new(false),
            })
        }
        Err(err) => {
            warn!(
                service_id = %options.service_id,
                error = %err,
                "failed to provision grain storage"
            );
            if let Err(close_err) = client.close().await {
                warn!(error = %close_err, "failed to release session after provisioning error");
            }
            Err(err)
        }
    }
}

async fn ensure_schema<C: ColumnClient>(
    client: &C,
    options: &CqlStorageOptions,
    cancel: &CancellationToken,
) -> Result<(), StorageError> {
    if cancel.is_cancelled() {
        return Err(StorageError::Cancelled);
    }
    let keyspace_exists = client
        .keyspace_exists(&options.keyspace)
        .await
        .map_err(provisioning)?;
    if !keyspace_exists {
        client
            .create_keyspace(&options.keyspace, options.replication_factor)
            .await
            .map_err(provisioning)?;
    }

    if cancel.is_cancelled() {
        return Err(StorageError::Cancelled);
    }
    let table_exists = client
        .table_exists(&options.table_name)
        .await
        .map_err(provisioning)?;
    if !table_exists {
        client
            .create_table(&options.table_name)
            .await
            .map_err(provisioning)?;
    }
    Ok(())
}

fn provisioning(err: crate::cql::CqlError) -> StorageError {
    StorageError::Provisioning(err.to_string())
}
