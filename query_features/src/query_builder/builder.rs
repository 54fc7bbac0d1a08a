//! Executable list query
//!
//! A [`ListQuery`] is the immutable result of the feature pipeline and also
//! the base query route handlers start from (`Tour.find()` becomes
//! `ListQuery::new("tours")`).

use crate::query_builder::filter::QueryFilter;
use crate::query_builder::ordering::{SortKey, SortOrder};
use crate::query_builder::pagination::PageSpec;
use crate::query_builder::projection::Projection;
use crate::query_builder::sql_generation::{SqlGenerator, SqlParam};
use crate::validation::{FieldPath, ValidatedTableName};

/// Query over one document collection
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub(crate) collection: String,
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<SortKey>,
    pub(crate) projection: Projection,
    pub(crate) limit: Option<u64>,
    pub(crate) skip: Option<u64>,
}

impl ListQuery {
    /// Every document of a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            projection: Projection::All,
            limit: None,
            skip: None,
        }
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add ordering, lower priority than keys added before
    pub fn order_by(mut self, field: FieldPath, order: SortOrder) -> Self {
        self.order_by.push(SortKey::new(field, order));
        self
    }

    /// Add several sort keys in priority order
    pub fn sort_keys(mut self, keys: Vec<SortKey>) -> Self {
        self.order_by.extend(keys);
        self
    }

    /// Replace the projection
    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Window the results to one page
    pub fn page(self, page: PageSpec) -> Self {
        self.skip(page.skip()).limit(page.limit())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn conditions(&self) -> &[QueryFilter] {
        &self.conditions
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.order_by
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }

    /// Build the SELECT statement for a JSONB document table
    pub fn build_select(&self, table: &ValidatedTableName) -> (String, Vec<SqlParam>) {
        let mut params = Vec::new();
        let projection = SqlGenerator::build_projection(&self.projection, &mut params);
        let where_clause = SqlGenerator::build_where_clause(&self.conditions, &mut params);
        let order_clause = SqlGenerator::build_order_clause(&self.order_by, &mut params);
        let limit_clause = SqlGenerator::build_limit_clause(self.limit, self.skip);

        let sql = [
            format!("SELECT {} AS doc FROM {}", projection, table),
            where_clause,
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        (sql, params)
    }

    /// Build a COUNT statement over the same conditions, ignoring the window
    pub fn build_count(&self, table: &ValidatedTableName) -> (String, Vec<SqlParam>) {
        let mut params = Vec::new();
        let where_clause = SqlGenerator::build_where_clause(&self.conditions, &mut params);

        let sql = if where_clause.is_empty() {
            format!("SELECT COUNT(*) FROM {}", table)
        } else {
            format!("SELECT COUNT(*) FROM {} {}", table, where_clause)
        };

        (sql, params)
    }
}
