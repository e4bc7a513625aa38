use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_work_factor: u32,
}

pub const DEFAULT_JWT_SECRET: &str = "secret-dev";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/jobly";
const TEST_DATABASE_NAME: &str = "jobly_test";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("test") => Environment::Test,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if self.environment == Environment::Test {
            self.database.url = swap_database_name(&self.database.url, TEST_DATABASE_NAME);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_WORK_FACTOR") {
            self.security.bcrypt_work_factor = v.parse().unwrap_or(self.security.bcrypt_work_factor);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 3001 },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_work_factor: 10,
            },
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 3001 },
            database: DatabaseConfig {
                url: swap_database_name(DEFAULT_DATABASE_URL, TEST_DATABASE_NAME),
                max_connections: 5,
                connection_timeout: 5,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 1,
                // bcrypt's minimum cost
                bcrypt_work_factor: 4,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 3001 },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 4,
                bcrypt_work_factor: 12,
            },
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.security.jwt_secret == DEFAULT_JWT_SECRET
    }
}

/// Replace the database path of a connection URL, keeping credentials and
/// query parameters. Unparseable URLs are returned unchanged.
fn swap_database_name(base: &str, database_name: &str) -> String {
    match url::Url::parse(base) {
        Ok(mut url) => {
            url.set_path(&format!("/{}", database_name));
            url.into()
        }
        Err(_) => base.to_string(),
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
