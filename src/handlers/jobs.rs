// handlers/jobs.rs - /jobs routes

use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    Path, Query, State,
};
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{authorize, AccessRequest, Policy};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Job, JobSearch, JobUpdate, NewJob};
use crate::AppState;

/// POST /jobs - Create a job (admin)
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<NewJob>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let Json(data) = payload?;
    data.validate()?;

    let job = Job::create(&state.pool, data).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// GET /jobs - List jobs, optionally filtered by `title`, `minSalary` and
/// `hasEquity`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<JobSearch>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(search) = query?;
    search.validate()?;

    let jobs = Job::find_all(&state.pool, &search).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - Job with its company
pub async fn get(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> ApiResult<Value> {
    let Path(id) = path?;

    let job = Job::get(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// PATCH /jobs/:id - Update title, salary or equity (admin)
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<JobUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let Path(id) = path?;
    let Json(data) = payload?;
    data.validate()?;

    let job = Job::update(&state.pool, id, data).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id (admin)
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let Path(id) = path?;
    Job::remove(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
