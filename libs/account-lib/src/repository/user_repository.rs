use async_trait::async_trait;
use sqlx::{query_as, MySqlPool};
use uuid::Uuid;

use crate::repository::errors::RepositoryError;
use crate::repository::models::UserRow;
use crate::repository::traits::UserRepositoryTrait;

const USER_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.first_name, u.last_name,
    u.image_id, u.security_stamp,
    (SELECT COUNT(*) FROM articles a WHERE a.author_id = u.id) AS article_count
"#;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pub pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, RepositoryError> {
        let user = query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?"
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(user)
    }

    async fn get_users(&self) -> Result<Vec<UserRow>, RepositoryError> {
        let users = query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u ORDER BY u.email"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(users)
    }
}
