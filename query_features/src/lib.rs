//! Query Features - list-request pipeline for QueryHaus
//!
//! This crate turns the query-string parameters of a list endpoint into an
//! executable [`ListQuery`]: filtering, sorting, field projection and
//! pagination, plus the SQL generation used by the PostgreSQL store.

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

pub mod features;
pub mod params;
pub mod prelude;
pub mod query_builder;
pub mod validation;

pub use features::{coerce_scalar, QueryFeatures};
pub use params::{ParamValue, QueryAlias, RawParameterMap};
pub use query_builder::{
    ListQuery, LogicalOperator, PageSpec, Projection, QueryCondition, QueryFilter, QueryOperator,
    SortKey, SortOrder, SqlGenerator, SqlParam,
};
pub use validation::{FieldPath, ValidatedTableName, ValidationError};
