use axum::Json;

use account_lib::errors_service::UserServiceError;

use crate::auth::AuthSubject;
use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::ProfileResponse;
use crate::methods::routes::PROFILE_PATH;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = PROFILE_PATH,
    tag = "profile",
    responses(
        (status = 200, description = "The caller's own profile", body = ProfileResponse),
        (status = 401, description = "Missing auth subject"),
        (status = 404, description = "No record for the caller"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_profile(
    AuthSubject(subject_id): AuthSubject,
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    state
        .user_service
        .get_profile(subject_id)
        .await
        .map(|view| Json(ProfileResponse::from(view)))
        .map_err(|e| match e {
            UserServiceError::NotFound => ApiError::user_not_found(),
            other => handle_service_error(other, &state.env, "get_profile"),
        })
}
