use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::{AddUserRequest, OperationResponse};
use crate::methods::routes::USERS_PATH;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = USERS_PATH,
    tag = "users",
    request_body = AddUserRequest,
    responses(
        (status = 201, description = "User created", body = OperationResponse),
        (status = 422, description = "Field or provider errors; re-render the form from the body", body = OperationResponse),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn add_user(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(payload): Json<AddUserRequest>,
) -> Result<Response, ApiError> {
    let result = state
        .user_service
        .create_user(payload.into())
        .await
        .map_err(|e| handle_service_error(e, &state.env, "add_user"))?;

    let status = if result.succeeded {
        StatusCode::CREATED
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, Json(OperationResponse::from(result))).into_response())
}
