use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::secret::redact_secret;

/// Server-side key record. Holds the raw secret; it must never be serialized
/// onto the dashboard API except through [`CreatedApiKey`] at creation time.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub secret: String,
    /// The single model this key is authorized for.
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Client-facing projection of a key. Carries only the redacted secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: String,
    pub name: String,
    pub secret_key_display: String,
    pub created_at: DateTime<Utc>,
    pub project_access: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKey {
    #[serde(default = "default_key_name")]
    pub name: String,
    pub model_name: String,
}

fn default_key_name() -> String {
    "Untitled Key".into()
}

/// Create response: the one place the full secret crosses the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedApiKey {
    pub secret_key: String,
    #[serde(flatten)]
    pub record: ApiKeyRecord,
}

impl ApiKey {
    pub fn to_record(&self) -> ApiKeyRecord {
        ApiKeyRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            secret_key_display: redact_secret(&self.secret),
            created_at: self.created_at,
            project_access: self.model.clone(),
        }
    }
}
