use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn, Span};

use crate::contract::model::{EventKind, InboundEvent, SyncOutcome, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::event::decode_event;
use crate::domain::repo::UsersRepository;
use crate::domain::signature::{WebhookHeaders, WebhookVerifier};

/// Domain service: verify, decode and apply identity lifecycle events.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    verifier: Arc<WebhookVerifier>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Credits granted to a user row when it is first created.
    pub default_credits: i32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_credits: 10,
        }
    }
}

impl Service {
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        verifier: Arc<WebhookVerifier>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            verifier,
            config,
        }
    }

    /// Full webhook pipeline over the raw request body.
    ///
    /// The signature is checked against the exact bytes received; the body is
    /// parsed only once that succeeds.
    #[instrument(
        name = "identity_sync.service.handle",
        skip_all,
        fields(body_len = body.len(), event_type, external_id)
    )]
    pub async fn handle(
        &self,
        body: &[u8],
        headers: &WebhookHeaders,
    ) -> Result<SyncOutcome, DomainError> {
        if let Err(e) = self.verifier.verify(body, headers) {
            warn!(error = %e, "Rejected webhook");
            return Err(e);
        }
        debug!("Webhook signature verified");

        let event = match decode_event(body) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Rejected webhook payload");
                return Err(e);
            }
        };

        let span = Span::current();
        span.record("event_type", event.kind.as_str());
        span.record("external_id", event.subject_id.as_str());

        self.apply_event(event).await
    }

    /// Apply an already-verified event to the store.
    #[instrument(
        name = "identity_sync.service.apply_event",
        skip(self, event),
        fields(event_type = %event.kind, external_id = %event.subject_id)
    )]
    pub async fn apply_event(&self, event: InboundEvent) -> Result<SyncOutcome, DomainError> {
        let result = match &event.kind {
            EventKind::UserCreated | EventKind::UserUpdated => {
                self.repo
                    .upsert(
                        &event.subject_id,
                        event.user_fields(),
                        self.config.default_credits,
                        Utc::now(),
                    )
                    .await
                    .map(|()| SyncOutcome::Upserted {
                        external_id: event.subject_id.clone(),
                    })
            }
            EventKind::UserDeleted => self
                .repo
                .delete_by_external_id(&event.subject_id)
                .await
                .map(|existed| SyncOutcome::Deleted {
                    external_id: event.subject_id.clone(),
                    existed,
                }),
            EventKind::Other(event_type) => {
                debug!("Ignoring unhandled event type");
                return Ok(SyncOutcome::Ignored {
                    event_type: event_type.clone(),
                });
            }
        };

        match result {
            Ok(outcome) => {
                info!(?outcome, "Applied identity event");
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Failed to apply identity event");
                Err(DomainError::storage(e.to_string()))
            }
        }
    }

    #[instrument(name = "identity_sync.service.get_user", skip(self))]
    pub async fn get_user(&self, external_id: &str) -> Result<Option<UserRecord>, DomainError> {
        debug!("Getting user by external id");
        self.repo
            .find_by_external_id(external_id)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))
    }
}
