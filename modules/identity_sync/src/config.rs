use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::signature::{WebhookSecret, DEFAULT_TOLERANCE_SECS};

const MAX_TOLERANCE_SECS: i64 = 24 * 60 * 60;

/// Configuration for the identity_sync module
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySyncConfig {
    /// Shared signing secret, `whsec_<base64>`. Required.
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    #[serde(default = "default_tolerance_sec")]
    pub tolerance_sec: i64,
    #[serde(default = "default_credits")]
    pub default_credits: i32,
}

impl Default for IdentitySyncConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            webhook_path: default_webhook_path(),
            tolerance_sec: default_tolerance_sec(),
            default_credits: default_credits(),
        }
    }
}

impl std::fmt::Debug for IdentitySyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = if self.webhook_secret.is_empty() {
            "<unset>"
        } else {
            "[REDACTED]"
        };
        f.debug_struct("IdentitySyncConfig")
            .field("webhook_secret", &secret)
            .field("webhook_path", &self.webhook_path)
            .field("tolerance_sec", &self.tolerance_sec)
            .field("default_credits", &self.default_credits)
            .finish()
    }
}

impl IdentitySyncConfig {
    /// Check the config and decode the signing secret.
    ///
    /// A missing secret is fatal at startup: without it no request can be
    /// authenticated.
    pub fn validate(&self) -> Result<WebhookSecret, DomainError> {
        if !self.webhook_path.starts_with('/') {
            return Err(DomainError::config(format!(
                "webhook_path must start with '/', got {:?}",
                self.webhook_path
            )));
        }
        if !(1..=MAX_TOLERANCE_SECS).contains(&self.tolerance_sec) {
            return Err(DomainError::config(format!(
                "tolerance_sec must be between 1 and {MAX_TOLERANCE_SECS}"
            )));
        }
        if self.default_credits < 0 {
            return Err(DomainError::config("default_credits must not be negative"));
        }
        WebhookSecret::parse(&self.webhook_secret)
    }
}

fn default_webhook_path() -> String {
    "/api/clerk-webhook".to_string()
}

fn default_tolerance_sec() -> i64 {
    DEFAULT_TOLERANCE_SECS
}

fn default_credits() -> i32 {
    10
}
