//! Signed-webhook verification (Svix / Standard Webhooks scheme).
//!
//! The signed content is `{id}.{timestamp}.{raw body}`; the signature header
//! carries one or more space-separated `v1,<base64 HMAC-SHA256>` entries.
//! Verification always runs over the exact bytes received, before any parsing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretSlice};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::error::DomainError;

type HmacSha256 = Hmac<Sha256>;

pub const SVIX_ID: &str = "svix-id";
pub const SVIX_TIMESTAMP: &str = "svix-timestamp";
pub const SVIX_SIGNATURE: &str = "svix-signature";

pub const WEBHOOK_ID: &str = "webhook-id";
pub const WEBHOOK_TIMESTAMP: &str = "webhook-timestamp";
pub const WEBHOOK_SIGNATURE: &str = "webhook-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Default allowed clock skew between the sender's timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Shared webhook signing key, decoded from its `whsec_<base64>` form.
pub struct WebhookSecret(SecretSlice<u8>);

impl WebhookSecret {
    /// Accepts `whsec_<base64>` or a bare base64 key.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::config("webhook secret is not set"));
        }

        let encoded = trimmed.strip_prefix(SECRET_PREFIX).unwrap_or(trimmed);
        let key = BASE64
            .decode(encoded)
            .map_err(|e| DomainError::config(format!("webhook secret is not valid base64: {e}")))?;
        if key.is_empty() {
            return Err(DomainError::config("webhook secret decodes to an empty key"));
        }

        Ok(Self(key.into()))
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}

/// The signed-webhook header triple, as received. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub signature: Option<String>,
}

impl WebhookHeaders {
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            timestamp: Some(timestamp.into()),
            signature: Some(signature.into()),
        }
    }

    /// Collect the triple through a header lookup. The header family is chosen
    /// as a whole: `svix-*` when `svix-id` is present, otherwise the Standard
    /// Webhooks `webhook-*` names. Families are never mixed.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let [id, timestamp, signature] = match get(SVIX_ID) {
            Some(_) => [SVIX_ID, SVIX_TIMESTAMP, SVIX_SIGNATURE],
            None => [WEBHOOK_ID, WEBHOOK_TIMESTAMP, WEBHOOK_SIGNATURE],
        };
        Self {
            id: get(id),
            timestamp: get(timestamp),
            signature: get(signature),
        }
    }
}

fn require<'a>(value: &'a Option<String>, header: &str) -> Result<&'a str, DomainError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::unauthorized(format!("missing {header} header")))
}

/// HMAC-SHA256 verifier with timestamp tolerance and constant-time comparison.
#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
    tolerance: Duration,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: &WebhookSecret, tolerance: Duration) -> Result<Self, DomainError> {
        let mac = HmacSha256::new_from_slice(secret.0.expose_secret())
            .map_err(|e| DomainError::config(format!("unusable webhook secret: {e}")))?;
        Ok(Self { mac, tolerance })
    }

    pub fn verify(&self, body: &[u8], headers: &WebhookHeaders) -> Result<(), DomainError> {
        self.verify_at(body, headers, Utc::now())
    }

    /// Verify against an explicit clock.
    pub fn verify_at(
        &self,
        body: &[u8],
        headers: &WebhookHeaders,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let id = require(&headers.id, SVIX_ID)?;
        let timestamp = require(&headers.timestamp, SVIX_TIMESTAMP)?;
        let signature = require(&headers.signature, SVIX_SIGNATURE)?;

        let sent_at = timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| DomainError::unauthorized("invalid timestamp header"))?;

        let skew = now.signed_duration_since(sent_at);
        if skew > self.tolerance {
            return Err(DomainError::unauthorized("message timestamp too old"));
        }
        if skew < -self.tolerance {
            return Err(DomainError::unauthorized("message timestamp too new"));
        }

        let expected = self.compute(id, timestamp, body);
        let matched = signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, encoded)| BASE64.decode(encoded).ok())
            .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));

        if matched {
            Ok(())
        } else {
            Err(DomainError::unauthorized("no matching signature found"))
        }
    }

    /// Produce a `v1,<base64>` signature header value for the given message.
    pub fn sign(&self, id: &str, timestamp: i64, body: &[u8]) -> String {
        let sig = self.compute(id, &timestamp.to_string(), body);
        format!("{SIGNATURE_VERSION},{}", BASE64.encode(sig))
    }

    fn compute(&self, id: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }
}
