use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

use crate::auth::{identity_from_bearer, Identity};

/// Caller identity established by [`authenticate_jwt`]; `None` for
/// anonymous requests.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Resolve the bearer token, if any, and store the result in request
/// extensions. Never rejects: a missing or bad token leaves the request
/// anonymous so public routes stay reachable.
pub async fn authenticate_jwt(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = identity_from_bearer(header);
    if let Some(identity) = &identity {
        tracing::debug!("Authenticated {} (admin: {})", identity.username, identity.is_admin);
    }

    request.extensions_mut().insert(CurrentUser(identity));
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned().unwrap_or_default())
    }
}
