// handlers/companies.rs - /companies routes
//
// Reads are public; every write requires an admin.

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Path, Query, State,
};
use axum::Json;
use serde_json::{json, Value};

use crate::auth::{authorize, AccessRequest, Policy};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Company, CompanySearch, CompanyUpdate, NewCompany};
use crate::AppState;

/// POST /companies - Create a company (admin)
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<NewCompany>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let Json(data) = payload?;
    data.validate()?;

    let company = Company::create(&state.pool, data).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// GET /companies - List companies, optionally filtered by
/// `name`, `minEmployees` and `maxEmployees`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<CompanySearch>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(search) = query?;
    search.validate()?;

    let companies = Company::find_all(&state.pool, &search).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - Company with its jobs
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// PATCH /companies/:handle - Partial update (admin)
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(handle): Path<String>,
    payload: Result<Json<CompanyUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    let Json(data) = payload?;
    data.validate()?;

    let company = Company::update(&state.pool, &handle, data).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle (admin)
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(handle): Path<String>,
) -> ApiResult<Value> {
    authorize(Policy::AdminOnly, &AccessRequest::new(user.identity()))?;

    Company::remove(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
