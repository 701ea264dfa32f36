use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::constants::AUTH_SUBJECT_HEADER;
use crate::error::ApiError;

/// The caller's subject id, taken from the header the fronting auth layer
/// installs after verifying the session. Profile handlers use this and
/// nothing from the request body to pick the target record.
#[derive(Debug, Clone, Copy)]
pub struct AuthSubject(pub Uuid);

impl<S> FromRequestParts<S> for AuthSubject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AUTH_SUBJECT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::missing_subject)?;

        let subject = Uuid::parse_str(raw).map_err(|_| ApiError::invalid_uuid())?;
        Ok(AuthSubject(subject))
    }
}
