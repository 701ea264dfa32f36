use crate::provider::IdentityError;
use crate::repository::errors::RepositoryError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("resource not found")]
    NotFound,

    #[error("invalid UUID in database: {0}")]
    InvalidUuid(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => UserServiceError::NotFound,
            RepositoryError::Sqlx(_) => UserServiceError::Internal(err.into()),
        }
    }
}

/// Infrastructure-level provider failures become internal errors; policy
/// rejections never reach this conversion (they travel inside
/// `OperationResult`), and `NotFound` keeps its own channel.
impl From<IdentityError> for UserServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound => UserServiceError::NotFound,
            other => UserServiceError::Internal(other.into()),
        }
    }
}
