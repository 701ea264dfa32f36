use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use account_lib::errors_service::UserServiceError;

use crate::auth::AuthSubject;
use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::{ProfileUpdateResponse, UpdateProfileRequest};
use crate::methods::routes::PROFILE_PATH;
use crate::state::AppState;

#[utoipa::path(
    put,
    path = PROFILE_PATH,
    tag = "profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile update outcome", body = ProfileUpdateResponse),
        (status = 401, description = "Missing auth subject"),
        (status = 404, description = "No record for the caller"),
        (status = 422, description = "Update did not apply", body = ProfileUpdateResponse),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn update_profile(
    AuthSubject(subject_id): AuthSubject,
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let updated = state
        .user_service
        .update_profile(subject_id, payload.into())
        .await
        .map_err(|e| match e {
            UserServiceError::NotFound => ApiError::user_not_found(),
            other => handle_service_error(other, &state.env, "update_profile"),
        })?;

    let status = if updated {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(ProfileUpdateResponse { updated })).into_response())
}
