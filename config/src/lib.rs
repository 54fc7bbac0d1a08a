//! # Configuration Management for QueryHaus
//!
//! This crate provides centralized configuration structures for all QueryHaus components:
//! the list-query pipeline defaults and the PostgreSQL document store settings.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{DatabaseConfig, QueryConfig};
//!
//! let db_config = DatabaseConfig::new(
//!     "localhost".to_string(), 5432, "natours".to_string(),
//!     "postgres".to_string(), "password".to_string(),
//!     1, 10, 30, 600, 3600,
//! );
//!
//! let query_config = QueryConfig::default();
//! assert_eq!(query_config.default_limit, 100);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "natours"
//! username = "postgres"
//! password = "password"
//! min_connections = 1
//! max_connections = 10
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//! max_lifetime_seconds = 3600
//!
//! [query]
//! default_page = 1
//! default_limit = 100
//! default_sort = "-createdAt"
//! version_field = "__v"
//! id_field = "_id"
//! created_at_field = "createdAt"
//! reserved_keys = ["page", "sort", "limit", "fields"]
//! ```
//!
//! Every key of the `[query]` table is optional.
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from queryhaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./queryhaus.toml";
const CONFIG_PATH_VAR: &str = "QUERYHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
    pub max_lifetime_seconds: u64,
}

/// Defaults and control keys of the list-query pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page used when `page` is absent or not a positive integer
    pub default_page: u64,
    /// Page size used when `limit` is absent or not a positive integer
    pub default_limit: u64,
    /// Sort expression used when `sort` is absent
    pub default_sort: String,
    /// Internal field hidden when `fields` is absent
    pub version_field: String,
    /// Identity field kept by inclusion projections
    pub id_field: String,
    /// Creation timestamp stamped on insert
    pub created_at_field: String,
    /// Parameters that steer the pipeline and never become filter criteria
    pub reserved_keys: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 100,
            default_sort: "-createdAt".to_string(),
            version_field: "__v".to_string(),
            id_field: "_id".to_string(),
            created_at_field: "createdAt".to_string(),
            reserved_keys: ["page", "sort", "limit", "fields"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl QueryConfig {
    /// Whether `key` steers the pipeline instead of filtering
    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_keys.iter().any(|reserved| reserved == key)
    }

    /// Validate pipeline defaults
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page == 0 {
            return Err(ConfigError::Invalid(
                "Query default_page must be greater than 0".to_string(),
            ));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "Query default_limit must be greater than 0".to_string(),
            ));
        }
        if let Some(token) = self
            .default_sort
            .split(',')
            .map(str::trim)
            .find(|token| !is_sort_token(token))
        {
            return Err(ConfigError::Invalid(format!(
                "Query default_sort has an invalid sort key '{}'",
                token
            )));
        }
        if self.version_field.is_empty() {
            return Err(ConfigError::Invalid(
                "Query version_field cannot be empty".to_string(),
            ));
        }
        if self.id_field.is_empty() {
            return Err(ConfigError::Invalid(
                "Query id_field cannot be empty".to_string(),
            ));
        }
        if self.created_at_field.is_empty() {
            return Err(ConfigError::Invalid(
                "Query created_at_field cannot be empty".to_string(),
            ));
        }
        if self.reserved_keys.is_empty() {
            return Err(ConfigError::Invalid(
                "Query reserved_keys cannot be empty".to_string(),
            ));
        }
        if self.reserved_keys.iter().any(|key| key.is_empty()) {
            return Err(ConfigError::Invalid(
                "Query reserved_keys cannot contain empty keys".to_string(),
            ));
        }

        Ok(())
    }
}

/// `field` or `-field`, where the field is a dotted path of identifiers
fn is_sort_token(token: &str) -> bool {
    let path = token.strip_prefix('-').unwrap_or(token);
    !path.is_empty()
        && path.split('.').all(|segment| {
            segment.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the variable may come from the environment
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.database.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.database.min_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database min_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.database.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        self.query.validate()
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
        min_connections: u32,
        max_connections: u32,
        connection_timeout_seconds: u64,
        idle_timeout_seconds: u64,
        max_lifetime_seconds: u64,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
            min_connections,
            max_connections,
            connection_timeout_seconds,
            idle_timeout_seconds,
            max_lifetime_seconds,
        }
    }

    /// Build connection string
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}
