use axum::Json;
use uuid::Uuid;

use account_lib::errors_service::UserServiceError;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::UserWithRolesResponse;
use crate::methods::routes::USERS_BY_ID_PATH;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = USERS_BY_ID_PATH,
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 200, description = "User with their current role set, for the populated update form", body = UserWithRolesResponse),
        (status = 400, description = "Invalid UUID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_user_by_id(
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<UserWithRolesResponse>, ApiError> {
    let parsed_id = Uuid::parse_str(&id).map_err(|_| ApiError::invalid_uuid())?;

    state
        .user_service
        .get_user_with_roles(parsed_id)
        .await
        .map(|entry| Json(UserWithRolesResponse::from(entry)))
        .map_err(|e| match e {
            UserServiceError::NotFound => ApiError::user_not_found(),
            other => handle_service_error(other, &state.env, "get_user_by_id"),
        })
}
