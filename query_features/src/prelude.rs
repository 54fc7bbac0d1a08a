//! Convenience re-exports for common query-features usage

// Pipeline
pub use crate::features::QueryFeatures;
pub use crate::params::{ParamValue, QueryAlias, RawParameterMap};

// Query building
pub use crate::query_builder::{
    ListQuery, PageSpec, Projection, QueryFilter, QueryOperator, SortKey, SortOrder,
};

// Validation
pub use crate::validation::{FieldPath, ValidatedTableName, ValidationError};

// Pipeline defaults
pub use config::QueryConfig;

pub use serde_json::{json, Value};
