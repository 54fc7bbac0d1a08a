//! Filter conditions
//!
//! Conditions are ANDed together by [`ListQuery`](super::ListQuery); groups
//! allow nesting for structural pre-filters supplied by route handlers.

use crate::validation::FieldPath;
use serde_json::Value;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,  // =
    Gt,  // >
    Gte, // >=
    Lt,  // <
    Lte, // <=
    In,  // IN
}

impl QueryOperator {
    /// Translate a bracketed comparison token from a query string
    ///
    /// Only the four range tokens are recognized, anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gte" => Some(QueryOperator::Gte),
            "gt" => Some(QueryOperator::Gt),
            "lte" => Some(QueryOperator::Lte),
            "lt" => Some(QueryOperator::Lt),
            _ => None,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(
            self,
            QueryOperator::Gt | QueryOperator::Gte | QueryOperator::Lt | QueryOperator::Lte
        )
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::In => "IN",
        }
    }
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: FieldPath,
    pub operator: QueryOperator,
    pub value: Value,
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: FieldPath, operator: QueryOperator, value: Value) -> Self {
        Self::Condition(QueryCondition {
            field,
            operator,
            value,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Equal condition
    pub fn eq(field: FieldPath, value: Value) -> Self {
        Self::condition(field, QueryOperator::Eq, value)
    }

    /// Greater than condition
    pub fn gt(field: FieldPath, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gt, value)
    }

    /// Greater than or equal condition
    pub fn gte(field: FieldPath, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gte, value)
    }

    /// Less than condition
    pub fn lt(field: FieldPath, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lt, value)
    }

    /// Less than or equal condition
    pub fn lte(field: FieldPath, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lte, value)
    }

    /// IN condition
    pub fn in_values(field: FieldPath, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::In, Value::Array(values))
    }
}
