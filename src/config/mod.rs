use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; `None` only when running against the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub jwt_issuer: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 5000;

    /// Build the configuration from the process environment.
    ///
    /// `APP_ENV` selects the profile defaults, specific variables override them.
    /// Required values (`JWT_SECRET`, `DATABASE_URL`) are checked by the command
    /// that needs them, see [`AppConfig::jwt_secret`] and [`AppConfig::database_url`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(|name| env::var(name).ok())
    }

    fn with_overrides<F>(mut self, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(v) = var("PORT") {
            self.port = parse_var("PORT", v)?;
        }

        // Database overrides
        self.database.url = var("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // API overrides
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse_var("API_MAX_REQUEST_SIZE_BYTES", v)?;
        }

        // Security overrides
        self.security.jwt_secret = var("JWT_SECRET").unwrap_or_default();
        if let Some(v) = var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_var("SECURITY_JWT_EXPIRY_HOURS", v)?;
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    /// The token signing secret; serving without one is refused.
    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        Some(self.security.jwt_secret.as_str())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))
    }

    /// The database URL, or an error naming the missing variable.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            port: Self::DEFAULT_PORT,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                jwt_issuer: "storefront-api".to_string(),
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            port: Self::DEFAULT_PORT,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                jwt_issuer: "storefront-api".to_string(),
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            port: Self::DEFAULT_PORT,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                jwt_issuer: "storefront-api".to_string(),
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Development profile with a fixed secret, for tests and local tooling.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = jwt_secret.into();
        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
