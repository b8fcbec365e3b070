use keywarden_core::{ApiKeyRecord, CreateApiKey, CreatedApiKey};
use tokio::runtime::Runtime;

use crate::{HttpService, KeyService, ServiceError};

/// Blocking wrapper around the async `HttpService`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingHttpService {
    inner: HttpService,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: HttpService::new(base_url),
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.health_check())
    }

    pub fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        self.rt.block_on(self.inner.list_models())
    }

    pub fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError> {
        self.rt.block_on(self.inner.list_keys())
    }

    pub fn create_key(&self, input: &CreateApiKey) -> Result<CreatedApiKey, ServiceError> {
        self.rt.block_on(self.inner.create_key(input))
    }

    pub fn delete_key(&self, id: &str) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.delete_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spawn a test server on a background thread (since BlockingHttpService
    /// creates its own tokio runtime and cannot be nested inside another).
    /// Returns the base_url. The server stays alive indefinitely via
    /// `std::future::pending()`.
    fn spawn_blocking_server() -> String {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let server = keywarden_server::test_helpers::spawn_test_server().await;
                tx.send(server.base_url.clone()).unwrap();
                // Keep the server alive for the duration of the test
                std::future::pending::<()>().await;
            });
        });
        rx.recv().unwrap()
    }

    fn create_input(name: &str, model: &str) -> CreateApiKey {
        CreateApiKey {
            name: name.into(),
            model_name: model.into(),
        }
    }

    #[test]
    fn blocking_health_check() {
        let url = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);
        svc.health_check().unwrap();
    }

    #[test]
    fn blocking_list_models() {
        let url = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);
        let models = svc.list_models().unwrap();
        assert!(!models.is_empty());
    }

    #[test]
    fn blocking_key_create_list_delete() {
        let url = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);

        let models = svc.list_models().unwrap();
        let created = svc.create_key(&create_input("ci", &models[0])).unwrap();
        assert_ne!(created.record.secret_key_display, created.secret_key);

        let keys = svc.list_keys().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id, created.record.id);

        svc.delete_key(&created.record.id).unwrap();
        assert!(svc.list_keys().unwrap().is_empty());
    }

    #[test]
    fn blocking_create_with_unknown_model_fails() {
        let url = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);

        let err = svc
            .create_key(&create_input("ci", "definitely-not-a-model"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
