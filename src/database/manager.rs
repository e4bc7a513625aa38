use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::auth::password::PasswordError;
use crate::config::DatabaseConfig;
use crate::query::QueryError;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DatabaseError::Duplicate(format!("Duplicate entry: {}", db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::InvalidReference(format!("Invalid reference: {}", db_err.message()));
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Connection pool setup and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Open the pool and verify connectivity
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Build the pool without connecting; connections are opened on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        Ok(Self::pool_options(config).connect_lazy(&config.url)?)
    }

    /// Apply pending migrations from `./migrations`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_stays_opaque() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn lazy_pool_does_not_connect() {
        let config = DatabaseConfig {
            url: "postgres://nobody@127.0.0.1:1/none".to_string(),
            max_connections: 1,
            connection_timeout: 1,
            run_migrations: false,
        };
        let pool = DatabaseManager::connect_lazy(&config).unwrap();
        assert_eq!(pool.size(), 0);
    }
}
