use secrecy::Secret;
use serde::Deserialize;
use uuid::Uuid;

/// Fields an administrator supplies when adding a user. Password hashing is
/// the identity provider's business; the plaintext only travels wrapped.
#[derive(Debug, Deserialize)]
pub struct UserAddDto {
    pub email: String,
    pub password: Secret<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

/// Mutable subset for the admin update form. Fields overwrite the loaded
/// entity wholesale; the merged entity is revalidated as a whole.
#[derive(Debug, Deserialize)]
pub struct UserUpdateDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

/// Self-service profile form. Deliberately carries no user id: the target
/// record is always the caller's own, resolved from the session subject.
#[derive(Debug, Deserialize)]
pub struct UserProfileDto {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_id: Option<Uuid>,
}
