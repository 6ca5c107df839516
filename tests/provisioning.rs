mod support;

use cql_grain_store::{
    provision, CancellationToken, ConcurrencyRegistry, CqlStorageOptions, GrainRef,
    InMemoryColumnClient, StorageError,
};
use serde_json::json;
use support::provisioned_storage;

#[tokio::test]
async fn provisioning_is_idempotent_across_restarts() {
    let client = InMemoryColumnClient::new();
    let options = CqlStorageOptions::default();

    let first = provision(client.clone(), &options, &CancellationToken::new())
        .await
        .unwrap();
    let second = provision(client.clone(), &options, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(client.create_keyspace_calls(), 1);
    assert_eq!(client.create_table_calls(), 1);

    first.close().await.unwrap();
    second.close().await.unwrap();
}

#[tokio::test]
async fn cancelled_provisioning_fails_and_releases_the_session() {
    let client = InMemoryColumnClient::new();
    let options = CqlStorageOptions::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = provision(client.clone(), &options, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::Cancelled);
    assert!(client.is_closed());
}

#[tokio::test]
async fn failed_provisioning_is_fatal_and_releases_the_session() {
    let client = InMemoryColumnClient::new();
    let options = CqlStorageOptions::default();

    client.fail_next("no contact points reachable");
    let err = provision(client.clone(), &options, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Provisioning(_)));
    assert!(client.is_closed());
}

#[tokio::test]
async fn close_is_idempotent_and_operations_fail_afterwards() {
    let (storage, client) = provisioned_storage(
        CqlStorageOptions::default(),
        ConcurrencyRegistry::new(["Counter"]),
    )
    .await;

    storage.close().await.unwrap();
    storage.close().await.unwrap();
    assert!(client.is_closed());

    let grain = GrainRef::new("Counter", "after-close");
    let err = storage
        .write_state("Counter", &grain, &json!({}), "")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Driver(_)));
}
