use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// Identity record for an article author or administrator.
///
/// `username` is kept equal to `email` on every write path; the security
/// stamp is rotated whenever the email changes so sessions bound to the old
/// stamp stop validating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct AppUser {
    pub id: Uuid,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    pub image_id: Option<Uuid>,
    pub security_stamp: String,
}

/// Profile-shaped projection of the caller's own record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileView {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_id: Option<Uuid>,
}

/// Listing projection: one user plus resolved role names and how many
/// articles they have authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRoles {
    pub user: AppUser,
    pub roles: Vec<Role>,
    pub article_count: i64,
}
