// handlers/users.rs - /users routes
//
// Listing and creating users is admin-only. Per-user routes allow the user
// themself or an admin, except that only the user may change their password.

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{authorize, create_token, AccessRequest, Identity, Policy};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{NewUser, User, UserUpdate};
use crate::AppState;

/// POST /users - Create a user, possibly an admin (admin)
///
/// Returns the new user together with a token for them.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let Json(data) = payload?;
    data.validate()?;

    let created = User::register(&state.pool, data).await?;
    let token = create_token(&Identity::new(&created.username, created.is_admin))?;
    Ok(ApiResponse::created(json!({ "user": created, "token": token })))
}

/// GET /users (admin)
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let users = User::find_all(&state.pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username - User with the ids of jobs applied to
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    authorize(Policy::SelfOrAdmin, &AccessRequest::new(user.identity()).target(&username))?;

    let detail = User::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": detail })))
}

/// PATCH /users/:username - Update profile fields or password
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(username): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    // Decided on the raw body so a password travelling with fields the typed
    // update rejects still narrows access. An unreadable body counts as one.
    let sensitive = payload.as_ref().map_or(true, |Json(body)| UserUpdate::touches_password(body));
    authorize(
        Policy::SelfOrAdmin,
        &AccessRequest::new(user.identity())
            .target(&username)
            .sensitive_field(sensitive),
    )?;

    let Json(body) = payload?;
    let data = UserUpdate::from_body(body)?;
    data.validate()?;

    let updated = User::update(&state.pool, &username, data).await?;
    Ok(ApiResponse::success(json!({ "user": updated })))
}

/// DELETE /users/:username
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    authorize(Policy::SelfOrAdmin, &AccessRequest::new(user.identity()).target(&username))?;

    User::remove(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - Apply to a job
pub async fn apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((username, job_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    authorize(Policy::SelfOrAdmin, &AccessRequest::new(user.identity()).target(&username))?;

    let job_id: i32 = job_id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid job id: {}", job_id)))?;

    User::apply_to_job(&state.pool, &username, job_id).await?;
    Ok(ApiResponse::success(json!({ "applied": job_id })))
}
