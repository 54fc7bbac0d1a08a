//! # QueryHaus
//!
//! Query-string driven list endpoints over a JSON document store: filtering
//! with range operators, multi-key sorting, field projection and pagination,
//! plus the standard single-document handlers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use queryhaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let mut queryhaus = QueryHaus::connect(&config).await?;
//!
//!     let tours = queryhaus.register_resource("tours")?.clone();
//!     tours
//!         .create_one(json!({ "name": "The Forest Hiker", "price": 397, "difficulty": "easy" }))
//!         .await?;
//!
//!     let params = RawParameterMap::from_query_string("price[gte]=100&sort=-price&fields=name,price");
//!     let response = respond(tours.get_all(Vec::new(), params).await);
//!     println!("{}", response.body().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod handlers;
pub mod prelude;
pub mod response;

// Re-export the main public types for convenience
pub use core::QueryHaus;
pub use errors::{AppError, QueryHausError};
pub use handlers::{respond, Resource};
pub use response::{ApiResponse, ApiStatus};

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, QueryConfig};

// Re-export internal crates used by the public API
pub use document_store;
pub use query_features;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
