//! Query builder utilities
//!
//! This module provides the executable list query and its SQL generation.

pub mod builder;
pub mod filter;
pub mod ordering;
pub mod pagination;
pub mod projection;
pub mod sql_generation;


pub use builder::ListQuery;
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use ordering::{SortKey, SortOrder};
pub use pagination::PageSpec;
pub use projection::Projection;
pub use sql_generation::{SqlGenerator, SqlParam};
