use cql_grain_store::{
    provision, CancellationToken, ConcurrencyRegistry, CqlStorageOptions, GrainStorage,
    InMemoryColumnClient, JsonStateCodec,
};

pub type TestStorage = GrainStorage<InMemoryColumnClient, JsonStateCodec>;

/// Provision an in-memory column store and build a grain storage over it.
/// Returns the client too, so tests can inspect raw rows and inject faults.
pub async fn provisioned_storage(
    options: CqlStorageOptions,
    registry: ConcurrencyRegistry,
) -> (TestStorage, InMemoryColumnClient) {
    let client = InMemoryColumnClient::new();
    let session = provision(client.clone(), &options, &CancellationToken::new())
        .await
        .expect("provisioning against the in-memory client should succeed");
    let codec = JsonStateCodec::new(options.service_id.clone(), options.codec.clone());
    let storage = GrainStorage::new(session, &options, registry, codec);
    (storage, client)
}

/// Storage with default options and the given concurrency-controlled tags.
pub async fn storage_with_tags(tags: &[&str]) -> (TestStorage, InMemoryColumnClient) {
    provisioned_storage(
        CqlStorageOptions::default(),
        ConcurrencyRegistry::new(tags.iter().copied()),
    )
    .await
}
