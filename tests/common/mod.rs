#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use jobly_api::{
    app,
    auth::{create_token, Identity},
    config::DatabaseConfig,
    database::DatabaseManager,
    AppState,
};

/// Router backed by a pool that never connects. Anything that reaches
/// storage fails with 503; authorization and validation run normally.
pub fn offline_app() -> Router {
    let config = DatabaseConfig {
        url: "postgres://nobody@127.0.0.1:1/jobly_offline".to_string(),
        max_connections: 1,
        connection_timeout: 1,
        run_migrations: false,
    };
    let pool = DatabaseManager::connect_lazy(&config).expect("lazy pool");
    app(AppState::new(pool))
}

pub fn token_for(username: &str, is_admin: bool) -> String {
    create_token(&Identity::new(username, is_admin)).expect("token")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    pub fn error_message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse { status, body }
}
