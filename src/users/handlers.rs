use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::error::UserResult;
use crate::state::AppState;
use crate::users::dto::{ApiResponse, CreateUserRequest, PublicUser, UpdateUserRequest};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/username/:username", get(get_user_by_username))
}

#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> UserResult<(StatusCode, Json<ApiResponse<PublicUser>>)> {
    let user = state.users.add_user(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "User created successfully",
            user,
        )),
    ))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<ApiResponse<PublicUser>>> {
    let user = state.users.get_user_by_id(&id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[instrument(skip(state))]
async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> UserResult<Json<ApiResponse<PublicUser>>> {
    let user = state.users.get_user_by_username(&username).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> UserResult<Json<ApiResponse<PublicUser>>> {
    let user = state.users.update_user(&id, payload).await?;
    Ok(Json(ApiResponse::success_with_message(
        "User updated successfully",
        user,
    )))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<ApiResponse<()>>> {
    state.users.delete_user(&id).await?;
    Ok(Json(ApiResponse::success_message("User deleted successfully")))
}
