//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it can run on a pooled
//! `DatabaseConnection` or inside a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::contract::model::{UserFields, UserRecord};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<UserRecord>> {
        let found = UserEntity::find()
            .filter(Column::ExternalId.eq(external_id))
            .one(&self.conn)
            .await
            .context("find_by_external_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn upsert(
        &self,
        external_id: &str,
        fields: UserFields,
        initial_credits: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let m = UserAM {
            id: Set(Uuid::new_v4()),
            external_id: Set(external_id.to_owned()),
            email: Set(fields.email),
            full_name: Set(fields.full_name),
            credits: Set(initial_credits),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // On conflict only the mutable columns move; id, credits and
        // created_at keep the values from the first insert.
        UserEntity::insert(m)
            .on_conflict(
                OnConflict::column(Column::ExternalId)
                    .update_columns([Column::Email, Column::FullName, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("upsert failed")?;
        Ok(())
    }

    async fn delete_by_external_id(&self, external_id: &str) -> anyhow::Result<bool> {
        let res = UserEntity::delete_many()
            .filter(Column::ExternalId.eq(external_id))
            .exec(&self.conn)
            .await
            .context("delete_by_external_id failed")?;
        Ok(res.rows_affected > 0)
    }
}
