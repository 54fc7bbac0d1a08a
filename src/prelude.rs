//! Convenience re-exports for common QueryHaus usage
//!
//! ```rust
//! use queryhaus::prelude::*;
//! ```

// Core QueryHaus components
pub use crate::core::QueryHaus;
pub use crate::errors::{AppError, QueryHausError};
pub use crate::handlers::{respond, Resource};
pub use crate::response::{ApiResponse, ApiStatus};

// Re-export centralized config
pub use config::{AppConfig, ConfigError, DatabaseConfig, QueryConfig};

// Query pipeline and stores
pub use document_store::{DocumentStore, MemoryStore, PgDocumentStore, StoreError};
pub use query_features::prelude::*;

// Common external dependencies
pub use async_trait;
pub use sqlx;
pub use tokio;

pub use sqlx::PgPool;
