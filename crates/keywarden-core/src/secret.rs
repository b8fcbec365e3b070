//! Secret display rules.
//!
//! A key secret is `sk-ollama-` followed by 48 hex chars. List views only
//! ever show the redacted form; the full value is revealed once, at creation.

pub const SECRET_PREFIX: &str = "sk-ollama-";

/// Redact a secret for list display: first 12 chars, ellipsis, last 4.
///
/// Secrets too short to redact meaningfully are returned unchanged rather
/// than panicking; real secrets are always long enough.
pub fn redact_secret(secret: &str) -> String {
    if secret.len() <= 16 || !secret.is_ascii() {
        return secret.to_string();
    }
    format!("{}...{}", &secret[..12], &secret[secret.len() - 4..])
}
