use crate::contract::model::UserRecord;
use crate::infra::storage::entity::Model as UserEntity;

impl From<UserEntity> for UserRecord {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            external_id: entity.external_id,
            email: entity.email,
            full_name: entity.full_name,
            credits: entity.credits,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
