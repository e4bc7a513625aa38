pub mod password;
pub mod policy;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config;

pub use policy::{authorize, AccessRequest, AuthError, Decision, Policy};

/// Authenticated caller for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self { username: username.into(), is_admin }
    }
}

/// JWT payload. `isAdmin` is kept as raw JSON on decode so a token carrying
/// a non-boolean value degrades to a non-admin identity instead of failing.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub username: String,
    #[serde(default)]
    pub is_admin: Value,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(identity: &Identity, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            username: identity.username.clone(),
            is_admin: Value::Bool(identity.is_admin),
            iat: now.timestamp(),
            exp,
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin == Value::Bool(true),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
}

/// Sign a token for `identity` with the configured secret and expiry.
pub fn create_token(identity: &Identity) -> Result<String, TokenError> {
    let security = &config::config().security;
    sign_token(identity, &security.jwt_secret, security.jwt_expiry_hours)
}

fn sign_token(identity: &Identity, secret: &str, expiry_hours: u64) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &Claims::new(identity, expiry_hours), &encoding_key)?)
}

/// Resolve an `Authorization` header value into an identity.
///
/// Anything short of a valid, unexpired `Bearer` token signed with our secret
/// yields `None`; callers continue anonymously.
pub fn identity_from_bearer(header: Option<&str>) -> Option<Identity> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    verify_token(token, &config::config().security.jwt_secret)
}

fn verify_token(token: &str, secret: &str) -> Option<Identity> {
    if secret.is_empty() {
        return None;
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    match decode::<Claims>(token, &decoding_key, &Validation::default()) {
        Ok(data) => Some(Identity::from(data.claims)),
        Err(e) => {
            tracing::debug!("Ignoring invalid JWT: {}", e);
            None
        }
    }
}
