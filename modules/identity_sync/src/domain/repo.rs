use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::contract::model::{UserFields, UserRecord};

/// Port for the domain layer: persistence operations the sync needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by the provider's identity key.
    async fn find_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Insert or update in one atomic statement keyed on `external_id`.
    ///
    /// `initial_credits` is written only when the row is created; an existing
    /// row gets `fields` and `updated_at = now` and keeps its credits.
    async fn upsert(
        &self,
        external_id: &str,
        fields: UserFields,
        initial_credits: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    /// Delete by identity key. Returns true if a row was deleted.
    async fn delete_by_external_id(&self, external_id: &str) -> anyhow::Result<bool>;
}
