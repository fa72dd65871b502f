use async_trait::async_trait;

use crate::contract::{
    error::IdentitySyncError,
    model::{InboundEvent, SyncOutcome, UserRecord},
};

/// In-process API of the identity_sync module for other crates.
///
/// Events passed here are trusted: signature verification belongs to the
/// webhook endpoint.
#[async_trait]
pub trait IdentitySyncApi: Send + Sync {
    /// Apply an already-verified lifecycle event to the user store
    async fn apply_event(&self, event: InboundEvent) -> Result<SyncOutcome, IdentitySyncError>;

    /// Look up a synchronized user by the provider's identity key
    async fn get_user(&self, external_id: &str) -> Result<Option<UserRecord>, IdentitySyncError>;
}
