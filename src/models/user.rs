use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::query::{bind_values_as, build_set_fragment, ColumnMap, FieldUpdates};

use super::nullable;
use super::validation::Validator;

pub const USER_COLUMNS: ColumnMap = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
];

/// Field whose presence in an update restricts it to the user themself.
pub const SENSITIVE_FIELD: &str = "password";

const USER_SELECT: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i32>,
}

#[derive(FromRow)]
struct StoredUser {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

impl From<StoredUser> for User {
    fn from(row: StoredUser) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("username", &self.username, 1, 25)
            .length("password", &self.password, 1, usize::MAX)
            .finish("Invalid credentials")
    }
}

/// Admin-created user; may be an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("username", &self.username, 1, 25)
            .length("password", &self.password, 5, 20)
            .length("firstName", &self.first_name, 1, 30)
            .length("lastName", &self.last_name, 1, 30)
            .email("email", Some(&self.email))
            .finish("Invalid user")
    }
}

/// Self-registration; never an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<Registration> for NewUser {
    fn from(r: Registration) -> Self {
        Self {
            username: r.username,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            is_admin: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub password: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
}

impl UserUpdate {
    /// True when the raw body names the password at all, whatever its value
    /// or whatever else the body carries.
    pub fn touches_password(body: &Value) -> bool {
        body.get(SENSITIVE_FIELD).is_some()
    }

    pub fn from_body(body: Value) -> Result<Self, ApiError> {
        serde_json::from_value(body).map_err(|e| ApiError::invalid_json(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .not_null("firstName", &self.first_name)
            .not_null("lastName", &self.last_name)
            .not_null("password", &self.password)
            .not_null("email", &self.email)
            .optional_length("firstName", flat(&self.first_name), 1, 30)
            .optional_length("lastName", flat(&self.last_name), 1, 30)
            .optional_length("password", flat(&self.password), 5, 20)
            .email("email", flat(&self.email))
            .finish("Invalid user update")
    }

    /// Field updates with the password (if any) already hashed.
    async fn into_updates(self) -> Result<FieldUpdates, DatabaseError> {
        let password = match self.password.flatten() {
            Some(plain) => Some(hash_password(plain).await?),
            None => None,
        };

        let mut updates = FieldUpdates::new();
        updates
            .set_if("firstName", self.first_name)
            .set_if("lastName", self.last_name)
            .set_if(SENSITIVE_FIELD, password)
            .set_if("email", self.email);
        Ok(updates)
    }
}

fn flat(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(Option::as_deref)
}

impl User {
    /// Returns the user when the password matches, `None` otherwise.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT password, {} FROM users WHERE username = $1", USER_SELECT);
        let Some(stored) = sqlx::query_as::<_, StoredUser>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
        else {
            // Same bcrypt cost as a real mismatch, so unknown names are not faster
            verify_against_dummy(password.to_string()).await?;
            return Ok(None);
        };

        if verify_password(password.to_string(), stored.password.clone()).await? {
            Ok(Some(stored.into()))
        } else {
            Ok(None)
        }
    }

    pub async fn register(pool: &PgPool, data: NewUser) -> Result<User, DatabaseError> {
        let existing = sqlx::query("SELECT username FROM users WHERE username = $1")
            .bind(&data.username)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            return Err(DatabaseError::Duplicate(format!("Duplicate username: {}", data.username)));
        }

        let hashed = hash_password(data.password).await?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_SELECT
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(&hashed)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await?;

        tracing::info!("Registered user {} (admin: {})", user.username, user.is_admin);
        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_SELECT);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(username))?;

        let applications: Vec<i32> =
            sqlx::query_scalar("SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id")
                .bind(username)
                .fetch_all(pool)
                .await?;

        Ok(UserDetail { user, applications })
    }

    pub async fn update(pool: &PgPool, username: &str, data: UserUpdate) -> Result<User, DatabaseError> {
        let updates = data.into_updates().await?;
        let fragment = build_set_fragment(&updates, USER_COLUMNS)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            fragment.sql,
            fragment.next_placeholder(),
            USER_SELECT
        );

        let q = bind_values_as(sqlx::query_as::<_, User>(&sql), &fragment.values).bind(username);
        let user = q.fetch_optional(pool).await?.ok_or_else(|| not_found(username))?;

        if updates.contains(SENSITIVE_FIELD) {
            tracing::info!("Password changed for user {}", username);
        }
        Ok(user)
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(username))?;

        tracing::info!("Deleted user {}", username);
        Ok(())
    }

    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DatabaseError> {
        sqlx::query("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| super::job::not_found(job_id))?;

        sqlx::query("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(username))?;

        sqlx::query("INSERT INTO applications (job_id, username) VALUES ($1, $2)")
            .bind(job_id)
            .bind(username)
            .execute(pool)
            .await
            .map_err(|e| match DatabaseError::from(e) {
                DatabaseError::Duplicate(_) => {
                    DatabaseError::Duplicate(format!("{} already applied to job {}", username, job_id))
                }
                other => other,
            })?;

        tracing::info!("{} applied to job {}", username, job_id);
        Ok(())
    }
}

fn not_found(username: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("No user: {}", username))
}
