//! Narrow seam in front of the external identity provider.
//!
//! The provider owns credential storage, password hashing and security
//! stamps. The service only ever talks to it through this trait, so tests
//! run against a mock and the HTTP client lives with the application.

use async_trait::async_trait;
use secrecy::Secret;
use uuid::Uuid;

use crate::entities::AppUser;
use crate::result::ProviderError;

/// What the provider knows about a subject, as needed by the service
/// (delete confirmation messaging, existence checks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySubject {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Structured policy rejection (duplicate email, weak password). These
    /// are reported back to the caller verbatim, never raised as faults.
    #[error("identity provider rejected the operation")]
    Rejected(Vec<ProviderError>),

    #[error("subject not found at identity provider")]
    NotFound,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response from identity provider: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait IdentityProviderTrait: Send + Sync {
    /// Create credentials for a new user. Hashing happens provider-side;
    /// the operation is atomic, so nothing persists on rejection.
    async fn create_user(
        &self,
        user: &AppUser,
        password: &Secret<String>,
    ) -> Result<(), IdentityError>;

    /// Persist updated profile fields, username and security stamp.
    async fn update_user(&self, user: &AppUser) -> Result<(), IdentityError>;

    /// Delete a subject. Role associations are removed in the same
    /// provider transaction.
    async fn delete_user(&self, user_id: Uuid) -> Result<(), IdentityError>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<IdentitySubject>, IdentityError>;

    /// Replace the subject's role set.
    async fn assign_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), IdentityError>;
}
