use std::sync::Arc;

use axum::Router;
use keywarden_service::{LocalService, ModelCatalog, StaticCatalog};
use tokio::net::TcpListener;

use crate::routes::{build_router, InnerAppState};

pub fn default_models() -> Vec<String> {
    vec!["llama3:8b".into(), "mistral:7b".into()]
}

/// Router with in-memory SQLite and a fixed model catalog.
pub fn test_router() -> Router {
    test_router_with_catalog(Arc::new(StaticCatalog(default_models())))
}

pub fn test_router_with_catalog(catalog: Arc<dyn ModelCatalog>) -> Router {
    // Nothing listens on the upstream port; proxy tests that need a live
    // upstream use `test_router_with_upstream`.
    build_test_router(catalog, "http://127.0.0.1:9")
}

pub fn test_router_with_upstream(upstream_url: &str) -> Router {
    build_test_router(Arc::new(StaticCatalog(default_models())), upstream_url)
}

fn build_test_router(catalog: Arc<dyn ModelCatalog>, upstream_url: &str) -> Router {
    let db = keywarden_db::Db::open_in_memory().unwrap();
    let state = Arc::new(InnerAppState {
        service: LocalService::new(db.clone(), catalog),
        db,
        upstream_url: upstream_url.trim_end_matches('/').to_string(),
        http: reqwest::Client::new(),
    });
    build_router(state)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    spawn(test_router()).await
}

pub async fn spawn_test_server_with_catalog(catalog: Arc<dyn ModelCatalog>) -> TestServer {
    spawn(test_router_with_catalog(catalog)).await
}

async fn spawn(app: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
