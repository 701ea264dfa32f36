use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::errors::RepositoryError;
use crate::repository::models::{RoleRow, UserRoleMapping, UserRow};

/// Read side of the user store. All mutation goes through the identity
/// provider; these queries only observe what it has persisted.
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, RepositoryError>;
    async fn get_users(&self) -> Result<Vec<UserRow>, RepositoryError>;
}

#[async_trait]
pub trait RoleRepositoryTrait: Send + Sync {
    async fn get_roles(&self) -> Result<Vec<RoleRow>, RepositoryError>;
    async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<RoleRow>, RepositoryError>;
    async fn get_roles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserRoleMapping>, RepositoryError>;
    /// How many of the given role ids actually exist.
    async fn count_existing(&self, role_ids: &[Uuid]) -> Result<u64, RepositoryError>;
}
