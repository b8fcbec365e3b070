use async_trait::async_trait;
use keywarden_core::{ApiKeyRecord, CreateApiKey, CreatedApiKey};
use reqwest::{Client, StatusCode};

use crate::{KeyService, ServiceError};

/// Async HTTP client implementation of KeyService.
/// Connects to a running keywarden-server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST => ServiceError::InvalidInput(msg),
        StatusCode::SERVICE_UNAVAILABLE => ServiceError::Unavailable(msg),
        _ => ServiceError::Internal(msg),
    }
}

#[async_trait]
impl KeyService for HttpService {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        self.get_json("/api/models").await
    }

    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError> {
        self.get_json("/api/keys").await
    }

    async fn create_key(&self, input: &CreateApiKey) -> Result<CreatedApiKey, ServiceError> {
        self.post_json("/api/keys", input).await
    }

    async fn delete_key(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/keys/{id}")).await
    }
}
