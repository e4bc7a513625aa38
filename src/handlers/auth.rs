// handlers/auth.rs - token acquisition (public)

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{create_token, Identity};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Credentials, NewUser, Registration, User};
use crate::AppState;

/// POST /auth/token - Exchange `{username, password}` for a JWT
pub async fn token(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(credentials) = payload?;
    credentials.validate()?;

    let user = User::authenticate(&state.pool, &credentials.username, &credentials.password)
        .await?
        .ok_or_else(|| {
            tracing::info!("Failed login for {}", credentials.username);
            ApiError::unauthorized("Invalid username/password")
        })?;

    let token = create_token(&Identity::new(user.username, user.is_admin))?;
    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - Create a regular user and return their JWT
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(registration) = payload?;
    let data = NewUser::from(registration);
    data.validate()?;

    let user = User::register(&state.pool, data).await?;
    let token = create_token(&Identity::new(user.username, user.is_admin))?;
    Ok(ApiResponse::created(json!({ "token": token })))
}
