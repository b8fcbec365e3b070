use async_trait::async_trait;
use serde::Deserialize;

use crate::ServiceError;

/// Source of the available-model list. The real catalog asks the Ollama
/// daemon; tests substitute fixed or failing catalogs.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError>;
}

/// Queries a running Ollama daemon via `GET /api/tags`.
pub struct OllamaCatalog {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaCatalog {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelCatalog for OllamaCatalog {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("could not reach ollama: {e}")))?;

        if !resp.status().is_success() {
            return Err(ServiceError::Unavailable(format!(
                "ollama returned {}",
                resp.status()
            )));
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Unavailable(format!("bad tags response: {e}")))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Fixed model set, independent of any running daemon.
pub struct StaticCatalog(pub Vec<String>);

#[async_trait]
impl ModelCatalog for StaticCatalog {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.0.clone())
    }
}

/// Always fails, as if the serving backend were down.
pub struct UnavailableCatalog;

#[async_trait]
impl ModelCatalog for UnavailableCatalog {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        Err(ServiceError::Unavailable("model backend is down".into()))
    }
}
