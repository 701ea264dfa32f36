use axum::Json;
use uuid::Uuid;

use account_lib::errors_service::UserServiceError;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::DeletedUserResponse;
use crate::methods::routes::USERS_BY_ID_PATH;
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = USERS_BY_ID_PATH,
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 200, description = "User deleted; body carries the removed email for confirmation messaging", body = DeletedUserResponse),
        (status = 400, description = "Invalid UUID"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn delete_user(
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<DeletedUserResponse>, ApiError> {
    let parsed_id = Uuid::parse_str(&id).map_err(|_| ApiError::invalid_uuid())?;

    state
        .user_service
        .delete_user(parsed_id)
        .await
        .map(|deleted| Json(DeletedUserResponse::from(deleted)))
        .map_err(|e| match e {
            UserServiceError::NotFound => ApiError::user_not_found(),
            other => handle_service_error(other, &state.env, "delete_user"),
        })
}
