//! Integration tests for HttpService against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 with in-memory
//! SQLite and a fixed model catalog, then exercises the HTTP client layer
//! through the full request/response cycle.

use std::sync::Arc;

use keywarden_core::CreateApiKey;
use keywarden_service::{HttpService, KeyService, ServiceError, UnavailableCatalog};

async fn spawn_server() -> String {
    let server = keywarden_server::test_helpers::spawn_test_server().await;
    server.base_url
}

fn create_input(name: &str, model: &str) -> CreateApiKey {
    CreateApiKey {
        name: name.into(),
        model_name: model.into(),
    }
}

#[tokio::test]
async fn health_check_via_http() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);
    svc.health_check().await.unwrap();
}

#[tokio::test]
async fn list_models_via_http() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);
    let models = svc.list_models().await.unwrap();
    assert_eq!(models, keywarden_server::test_helpers::default_models());
}

#[tokio::test]
async fn models_unavailable_maps_to_service_error() {
    let server = keywarden_server::test_helpers::spawn_test_server_with_catalog(Arc::new(
        UnavailableCatalog,
    ))
    .await;
    let svc = HttpService::new(&server.base_url);
    let err = svc.list_models().await.unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable(_)));
}

#[tokio::test]
async fn key_lifecycle_via_http() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);

    // Create
    let created = svc.create_key(&create_input("ci", "llama3:8b")).await.unwrap();
    assert!(created.secret_key.starts_with("sk-ollama-"));
    assert_ne!(created.record.secret_key_display, created.secret_key);

    // List shows only the redacted projection
    let keys = svc.list_keys().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].id, created.record.id);
    assert_eq!(keys[0].secret_key_display, created.record.secret_key_display);

    // Delete
    svc.delete_key(&created.record.id).await.unwrap();
    assert!(svc.list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_keys_order_is_newest_first() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);

    let a = svc.create_key(&create_input("a", "llama3:8b")).await.unwrap();
    let b = svc.create_key(&create_input("b", "llama3:8b")).await.unwrap();
    let c = svc.create_key(&create_input("c", "mistral:7b")).await.unwrap();

    let ids: Vec<String> = svc
        .list_keys()
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.id)
        .collect();
    assert_eq!(ids, vec![c.record.id, b.record.id, a.record.id]);
}

#[tokio::test]
async fn create_with_unknown_model_is_invalid_input() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);

    let err = svc
        .create_key(&create_input("ci", "missing:latest"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(svc.list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_unknown_key_is_not_found() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);

    let err = svc.delete_key("no-such-id").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn double_delete_is_not_found() {
    let url = spawn_server().await;
    let svc = HttpService::new(&url);

    let created = svc.create_key(&create_input("ci", "llama3:8b")).await.unwrap();
    svc.delete_key(&created.record.id).await.unwrap();

    let err = svc.delete_key(&created.record.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
