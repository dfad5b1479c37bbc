//! 账户接口

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::extract::{AppJson, AppPath};
use super::{created, ok, ApiResponse};
use crate::domains::accounts::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest};
use crate::error::AppResult;
use crate::storage::User;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let user = state.accounts.register(req).await?;
    Ok(created("User registered", user))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let user = state.accounts.login(req).await?;
    Ok(ok("Login successful", user))
}

pub async fn update_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.accounts.update_user(id, req).await?;
    Ok(ok("User updated", user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<i64>>> {
    state.accounts.delete_user(id).await?;
    Ok(ok("User deleted", id))
}
