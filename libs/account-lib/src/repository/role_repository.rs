use async_trait::async_trait;
use sqlx::{query_as, query_scalar, MySqlPool};
use uuid::Uuid;

use crate::repository::errors::RepositoryError;
use crate::repository::models::{RoleRow, UserRoleMapping};
use crate::repository::traits::RoleRepositoryTrait;

fn placeholders(count: usize) -> String {
    std::iter::repeat("?").take(count).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone)]
pub struct RoleRepository {
    pub pool: MySqlPool,
}

impl RoleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepositoryTrait for RoleRepository {
    async fn get_roles(&self) -> Result<Vec<RoleRow>, RepositoryError> {
        let roles = query_as::<_, RoleRow>(
            r#"
            SELECT id, name FROM roles ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(roles)
    }

    async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<RoleRow>, RepositoryError> {
        let roles = query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(roles)
    }

    async fn get_roles_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<UserRoleMapping>, RepositoryError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!(
            r#"
            SELECT ur.user_id, ur.role_id, r.name AS role_name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id IN ({})
            "#,
            placeholders(user_ids.len())
        );

        let mut query = query_as::<_, UserRoleMapping>(&sql);
        for id in user_ids {
            query = query.bind(id);
        }

        let mappings = query
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(mappings)
    }

    async fn count_existing(&self, role_ids: &[Uuid]) -> Result<u64, RepositoryError> {
        if role_ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM roles WHERE id IN ({})",
            placeholders(role_ids.len())
        );

        let mut query = query_scalar::<_, i64>(&sql);
        for id in role_ids {
            query = query.bind(id.to_string());
        }

        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(count as u64)
    }
}
