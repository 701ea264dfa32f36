use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_id: Option<String>,
    pub security_stamp: String,
    pub article_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRoleMapping {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
}
