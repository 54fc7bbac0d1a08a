//! Document Store - executors for QueryHaus list queries
//!
//! A [`DocumentStore`] runs a compiled [`query_features::ListQuery`] and the
//! single-document operations behind it. [`MemoryStore`] keeps collections in
//! process, [`PgDocumentStore`] keeps one JSONB table per collection.

pub mod document;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use document::{prepare_insert, sanitize_changes, timestamp_now, NewDocument};
pub use errors::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use traits::DocumentStore;

use sqlx::PgPool;

pub type DbPool = PgPool;
