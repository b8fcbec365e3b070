use std::sync::Arc;

use async_trait::async_trait;
use keywarden_core::{ApiKeyRecord, CreateApiKey, CreatedApiKey, SECRET_PREFIX};
use keywarden_db::Db;

use crate::{KeyService, ModelCatalog, ServiceError};

/// Local implementation backed by direct SQLite access plus a model catalog.
pub struct LocalService {
    db: Db,
    catalog: Arc<dyn ModelCatalog>,
}

impl LocalService {
    pub fn new(db: Db, catalog: Arc<dyn ModelCatalog>) -> Self {
        Self { db, catalog }
    }
}

impl From<keywarden_db::DbError> for ServiceError {
    fn from(e: keywarden_db::DbError) -> Self {
        match e {
            keywarden_db::DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Generate a fresh secret: the `sk-ollama-` prefix plus 48 hex chars.
pub fn generate_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let hex: String = (0..24).map(|_| format!("{:02x}", rng.gen::<u8>())).collect();
    format!("{SECRET_PREFIX}{hex}")
}

#[async_trait]
impl KeyService for LocalService {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        self.catalog.list_models().await
    }

    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError> {
        let keys = self.db.list_api_keys()?;
        Ok(keys.iter().map(|k| k.to_record()).collect())
    }

    async fn create_key(&self, input: &CreateApiKey) -> Result<CreatedApiKey, ServiceError> {
        // The key is scoped to a model, so the model must exist right now.
        let models = self.catalog.list_models().await?;
        if !models.iter().any(|m| m == &input.model_name) {
            return Err(ServiceError::InvalidInput(format!(
                "model '{}' not found",
                input.model_name
            )));
        }

        let secret = generate_secret();
        let key = self.db.insert_api_key(&input.name, &secret, &input.model_name)?;
        tracing::info!(key_id = %key.id, model = %key.model, "api key created");

        Ok(CreatedApiKey {
            secret_key: key.secret.clone(),
            record: key.to_record(),
        })
    }

    async fn delete_key(&self, id: &str) -> Result<(), ServiceError> {
        self.db.delete_api_key(id)?;
        tracing::info!(key_id = %id, "api key deleted");
        Ok(())
    }
}
