use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::IdentitySyncApi,
    error::IdentitySyncError,
    model::{InboundEvent, SyncOutcome, UserRecord},
};
use crate::domain::service::Service;

/// Local implementation of the IdentitySyncApi trait that delegates to the domain service
pub struct IdentitySyncLocalClient {
    service: Arc<Service>,
}

impl IdentitySyncLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl IdentitySyncApi for IdentitySyncLocalClient {
    async fn apply_event(&self, event: InboundEvent) -> Result<SyncOutcome, IdentitySyncError> {
        self.service.apply_event(event).await.map_err(Into::into)
    }

    async fn get_user(&self, external_id: &str) -> Result<Option<UserRecord>, IdentitySyncError> {
        self.service.get_user(external_id).await.map_err(Into::into)
    }
}
