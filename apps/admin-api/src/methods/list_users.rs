use axum::Json;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::UserWithRolesResponse;
use crate::methods::routes::USERS_PATH;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = USERS_PATH,
    tag = "users",
    responses(
        (status = 200, description = "All users with their resolved roles", body = [UserWithRolesResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn list_users(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<Vec<UserWithRolesResponse>>, ApiError> {
    state
        .user_service
        .get_users_with_roles()
        .await
        .map(|users| {
            Json(
                users
                    .into_iter()
                    .map(UserWithRolesResponse::from)
                    .collect(),
            )
        })
        .map_err(|e| handle_service_error(e, &state.env, "list_users"))
}
