pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .fallback(handlers::not_found)
        .with_state(state)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(middleware::authenticate_jwt)),
        )
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
}

fn company_routes() -> Router<AppState> {
    use handlers::companies;

    Router::new()
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/:handle",
            get(companies::get)
                .patch(companies::update)
                .delete(companies::remove),
        )
}

fn job_routes() -> Router<AppState> {
    use handlers::jobs;

    Router::new()
        .route("/jobs", get(jobs::list).post(jobs::create))
        .route("/jobs/:id", get(jobs::get).patch(jobs::update).delete(jobs::remove))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/:username",
            get(users::get).patch(users::update).delete(users::remove),
        )
        .route("/users/:username/jobs/:id", post(users::apply))
}
