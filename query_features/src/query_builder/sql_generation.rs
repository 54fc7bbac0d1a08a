//! SQL generation for JSONB document tables
//!
//! Documents live in a `doc JSONB` column. Every value and every field path
//! is bound as a parameter, only operators and placeholders are formatted
//! into the statement.

use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortKey;
use crate::query_builder::projection::Projection;
use crate::validation::FieldPath;
use serde_json::Value;

/// Bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Json(Value),
    TextArray(Vec<String>),
}

pub struct SqlGenerator;

/// Largest LIMIT/OFFSET PostgreSQL accepts (bigint)
const MAX_ROW_COUNT: u64 = i64::MAX as u64;

impl SqlGenerator {
    fn bind(param: SqlParam, params: &mut Vec<SqlParam>) -> String {
        params.push(param);
        format!("${}", params.len())
    }

    fn bind_json(value: &Value, params: &mut Vec<SqlParam>) -> String {
        format!("{}::jsonb", Self::bind(SqlParam::Json(value.clone()), params))
    }

    fn field_expr(field: &FieldPath, params: &mut Vec<SqlParam>) -> String {
        let path = field.segments().map(String::from).collect();
        format!("doc #> {}::text[]", Self::bind(SqlParam::TextArray(path), params))
    }

    /// Build WHERE clause from conditions
    pub fn build_where_clause(conditions: &[QueryFilter], params: &mut Vec<SqlParam>) -> String {
        if conditions.is_empty() {
            return String::new();
        }

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, params))
            .collect::<Vec<_>>()
            .join(" AND ");

        format!("WHERE {}", conditions_sql)
    }

    fn build_condition_sql(filter: &QueryFilter, params: &mut Vec<SqlParam>) -> String {
        match filter {
            QueryFilter::Condition(condition) => Self::build_single_condition_sql(condition, params),
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, params))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
        }
    }

    fn build_single_condition_sql(condition: &QueryCondition, params: &mut Vec<SqlParam>) -> String {
        let field = Self::field_expr(&condition.field, params);

        match condition.operator {
            QueryOperator::Eq => {
                let value = Self::bind_json(&condition.value, params);
                format!("{} = {}", field, value)
            }
            QueryOperator::Gt | QueryOperator::Gte | QueryOperator::Lt | QueryOperator::Lte => {
                // jsonb orders across types, ranges only compare like with like
                let value = Self::bind_json(&condition.value, params);
                format!(
                    "(jsonb_typeof({field}) = jsonb_typeof({value}) AND {field} {op} {value})",
                    field = field,
                    value = value,
                    op = condition.operator.to_sql()
                )
            }
            QueryOperator::In => match &condition.value {
                Value::Array(values) if !values.is_empty() => {
                    let placeholders: Vec<String> = values
                        .iter()
                        .map(|value| Self::bind_json(value, params))
                        .collect();
                    format!("{} IN ({})", field, placeholders.join(", "))
                }
                _ => "1=0".to_string(),
            },
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[SortKey], params: &mut Vec<SqlParam>) -> String {
        if order_by.is_empty() {
            return String::new();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|key| format!("{} {}", Self::field_expr(&key.field, params), key.order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<u64>, offset: Option<u64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit.min(MAX_ROW_COUNT)));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset.min(MAX_ROW_COUNT)));
        }

        clauses.join(" ")
    }

    /// Build the projected document expression
    ///
    /// Inclusion keeps matching top-level keys, exclusion removes full paths.
    pub fn build_projection(projection: &Projection, params: &mut Vec<SqlParam>) -> String {
        match projection {
            Projection::All => "doc".to_string(),
            Projection::Include(fields) => {
                let keys = fields.iter().map(|f| f.as_str().to_string()).collect();
                let keys = Self::bind(SqlParam::TextArray(keys), params);
                format!(
                    "COALESCE((SELECT jsonb_object_agg(key, value) FROM jsonb_each(doc) WHERE key = ANY({}::text[])), '{{}}'::jsonb)",
                    keys
                )
            }
            Projection::Exclude(fields) => fields.iter().fold("doc".to_string(), |expr, field| {
                let path = field.segments().map(String::from).collect();
                let path = Self::bind(SqlParam::TextArray(path), params);
                format!("({} #- {}::text[])", expr, path)
            }),
        }
    }
}
