use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use account_lib::errors_service::UserServiceError;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::{OperationResponse, UpdateUserRequest};
use crate::methods::routes::USERS_BY_ID_PATH;
use crate::state::AppState;

#[utoipa::path(
    put,
    path = USERS_BY_ID_PATH,
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID (UUID)")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = OperationResponse),
        (status = 400, description = "Invalid UUID"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Field or provider errors; re-render the form from the body", body = OperationResponse),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn update_user(
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Response, ApiError> {
    let parsed_id = Uuid::parse_str(&id).map_err(|_| ApiError::invalid_uuid())?;

    let result = state
        .user_service
        .update_user(payload.into_dto(parsed_id))
        .await
        .map_err(|e| match e {
            UserServiceError::NotFound => ApiError::user_not_found(),
            other => handle_service_error(other, &state.env, "update_user"),
        })?;

    let status = if result.succeeded {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(OperationResponse::from(result))).into_response())
}
