pub mod api_key;
pub mod secret;

pub use api_key::{ApiKey, ApiKeyRecord, CreateApiKey, CreatedApiKey};
pub use secret::{redact_secret, SECRET_PREFIX};
