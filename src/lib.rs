mod codec;
mod concurrency;
mod cql;
mod error;
mod grain_ref;
mod options;
mod row;
mod schema;
mod store;

pub use codec::{
    CodecError, FieldNaming, JsonCodecOptions, JsonStateCodec, StateCodec, TypeNameHandling,
};
pub use concurrency::ConcurrencyRegistry;
pub use cql::{CasOutcome, ColumnClient, Consistency, CqlError, InMemoryColumnClient};
pub use error::StorageError;
pub use grain_ref::{storage_key, GrainRef};
pub use options::CqlStorageOptions;
pub use row::{GrainStateRow, VersionedState};
pub use schema::{provision, ProvisionedSession};
pub use store::GrainStorage;

// Re-export the cancellation token used by `provision`.
pub use tokio_util::sync::CancellationToken;
