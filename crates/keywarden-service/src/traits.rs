use async_trait::async_trait;
use keywarden_core::{ApiKeyRecord, CreateApiKey, CreatedApiKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Abstraction over key-lifecycle operations.
///
/// The TUI and the server routes program against this trait.
/// `LocalService` wraps direct SQLite access plus a model catalog.
/// `HttpService` wraps an async HTTP client talking to a running server.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Model identifiers currently offered by the serving backend,
    /// in the order the backend reports them.
    async fn list_models(&self) -> Result<Vec<String>, ServiceError>;

    /// All keys as client projections, newest first.
    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError>;

    /// Mint a key bound to a model. The response is the only place the
    /// full secret is ever handed out.
    async fn create_key(&self, input: &CreateApiKey) -> Result<CreatedApiKey, ServiceError>;

    async fn delete_key(&self, id: &str) -> Result<(), ServiceError>;
}
