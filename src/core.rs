//! Core QueryHaus functionality
//!
//! [`QueryHaus`] owns the document store and the query configuration and
//! hands out one [`Resource`] per registered collection.

use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::QueryHausError;
use crate::handlers::Resource;
use config::{AppConfig, DatabaseConfig, QueryConfig};
use document_store::{DocumentStore, MemoryStore, PgDocumentStore};

/// Main QueryHaus coordinator
pub struct QueryHaus {
    pool: Option<PgPool>,
    store: Arc<dyn DocumentStore>,
    config: Arc<QueryConfig>,
    resources: HashMap<String, Resource>,
}

impl QueryHaus {
    /// Connect to PostgreSQL using the database section of `config`
    pub async fn connect(config: &AppConfig) -> Result<Self, QueryHausError> {
        config.validate()?;
        let pool = Self::build_pool(&config.database).await?;
        let store = PgDocumentStore::new(pool.clone(), config.query.clone());

        Ok(Self {
            pool: Some(pool),
            store: Arc::new(store),
            config: Arc::new(config.query.clone()),
            resources: HashMap::new(),
        })
    }

    /// Keep documents in process memory
    pub fn in_memory(config: QueryConfig) -> Result<Self, QueryHausError> {
        config.validate()?;
        Ok(Self::with_store(Arc::new(MemoryStore::new(config.clone())), config))
    }

    /// Use an existing store
    pub fn with_store(store: Arc<dyn DocumentStore>, config: QueryConfig) -> Self {
        Self {
            pool: None,
            store,
            config: Arc::new(config),
            resources: HashMap::new(),
        }
    }

    async fn build_pool(config: &DatabaseConfig) -> Result<PgPool, QueryHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            "Connected to PostgreSQL"
        );
        Ok(pool)
    }

    /// Database pool, when backed by PostgreSQL
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.config
    }

    /// Register a collection and return its handlers
    pub fn register_resource(&mut self, name: &str) -> Result<&Resource, QueryHausError> {
        if self.resources.contains_key(name) {
            return Err(QueryHausError::ResourceAlreadyRegistered(name.to_string()));
        }
        query_features::ValidatedTableName::new(name)
            .map_err(|e| QueryHausError::Store(e.into()))?;

        let resource = Resource::new(name, Arc::clone(&self.store), Arc::clone(&self.config));
        Ok(self.resources.entry(name.to_string()).or_insert(resource))
    }

    /// Get a registered resource by name
    pub fn resource(&self, name: &str) -> Result<&Resource, QueryHausError> {
        self.resources
            .get(name)
            .ok_or_else(|| QueryHausError::ResourceNotFound(name.to_string()))
    }

    /// List all registered resource names
    pub fn list_resources(&self) -> Vec<&String> {
        self.resources.keys().collect()
    }

    /// Remove a resource by name
    pub fn unregister_resource(&mut self, name: &str) -> Result<(), QueryHausError> {
        self.resources
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| QueryHausError::ResourceNotFound(name.to_string()))
    }

    /// Check database connection health, always fine for in-memory stores
    pub async fn health_check(&self) -> Result<(), QueryHausError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").fetch_one(pool).await?;
        }
        Ok(())
    }
}
