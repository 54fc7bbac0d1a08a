//! In-memory document store
//!
//! Evaluates list queries the way the PostgreSQL store does: range
//! comparisons only match values of the same JSON type, missing fields sort
//! lowest, ties keep insertion order.

use crate::document::{prepare_insert, sanitize_changes};
use crate::errors::StoreError;
use crate::traits::DocumentStore;
use async_trait::async_trait;
use config::QueryConfig;
use query_features::{
    FieldPath, ListQuery, LogicalOperator, Projection, QueryCondition, QueryFilter, QueryOperator,
    SortKey, SortOrder,
};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

type Collection = Vec<Map<String, Value>>;

pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    config: QueryConfig,
}

impl MemoryStore {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn id_of<'a>(&self, document: &'a Map<String, Value>) -> Option<&'a str> {
        document.get(&self.config.id_field).and_then(Value::as_str)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let prepared = prepare_insert(document, &self.config)?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents
            .iter()
            .any(|existing| self.id_of(existing) == Some(prepared.id.as_str()))
        {
            return Err(StoreError::DuplicateKey {
                field: self.config.id_field.clone(),
                value: prepared.id,
            });
        }

        documents.push(prepared.body.clone());
        Ok(Value::Object(prepared.body))
    }

    async fn find(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(query.collection()) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Map<String, Value>> = documents
            .iter()
            .filter(|document| matches_all(query.conditions(), document))
            .collect();

        // stable, so equal keys keep insertion order
        matched.sort_by(|a, b| compare_documents(query.sort(), a, b));

        let skip = query.skip_value().unwrap_or(0);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = query
            .limit_value()
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        let results = matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| project(document, query.projection()))
            .collect();

        Ok(results)
    }

    async fn count(&self, query: &ListQuery) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(query.collection())
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches_all(query.conditions(), document))
                    .count()
            })
            .unwrap_or(0);

        Ok(count as u64)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        let found = collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| self.id_of(document) == Some(id))
                .cloned()
                .map(Value::Object)
        });

        Ok(found)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let changes = sanitize_changes(changes, &self.config);
        let mut collections = self.collections.write().await;

        let Some(document) = collections.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|document| self.id_of(document) == Some(id))
        }) else {
            return Ok(None);
        };

        document.extend(changes);
        Ok(Some(Value::Object(document.clone())))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = documents.len();
        documents.retain(|document| self.id_of(document) != Some(id));
        Ok(documents.len() < before)
    }
}

fn lookup<'a>(document: &'a Map<String, Value>, field: &FieldPath) -> Option<&'a Value> {
    let mut segments = field.segments();
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn matches_all(filters: &[QueryFilter], document: &Map<String, Value>) -> bool {
    filters.iter().all(|filter| matches_filter(filter, document))
}

fn matches_filter(filter: &QueryFilter, document: &Map<String, Value>) -> bool {
    match filter {
        QueryFilter::Condition(condition) => matches_condition(condition, document),
        QueryFilter::Group { operator, filters } => match operator {
            LogicalOperator::And => matches_all(filters, document),
            LogicalOperator::Or => filters.iter().any(|f| matches_filter(f, document)),
        },
    }
}

fn matches_condition(condition: &QueryCondition, document: &Map<String, Value>) -> bool {
    let Some(actual) = lookup(document, &condition.field) else {
        return false;
    };

    if condition.operator.is_range() && type_rank(actual) != type_rank(&condition.value) {
        return false;
    }

    let ordering = || compare_values(actual, &condition.value);
    match condition.operator {
        QueryOperator::Eq => ordering() == Ordering::Equal,
        QueryOperator::Gt => ordering() == Ordering::Greater,
        QueryOperator::Gte => ordering() != Ordering::Less,
        QueryOperator::Lt => ordering() == Ordering::Less,
        QueryOperator::Lte => ordering() != Ordering::Greater,
        QueryOperator::In => condition.value.as_array().is_some_and(|candidates| {
            candidates
                .iter()
                .any(|candidate| compare_values(actual, candidate) == Ordering::Equal)
        }),
    }
}

fn compare_documents(
    keys: &[SortKey],
    a: &Map<String, Value>,
    b: &Map<String, Value>,
) -> Ordering {
    for key in keys {
        let ordering = match (lookup(a, &key.field), lookup(b, &key.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => compare_values(a, b),
        };

        let ordering = match key.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Cross-type order of JSON values: null < string < number < bool < array < object
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::String(_) => 1,
        Value::Number(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a.len().cmp(&b.len()).then_with(|| {
            a.iter()
                .zip(b)
                .map(|(a, b)| compare_values(a, b))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        }),
        (Value::Object(a), Value::Object(b)) => a.len().cmp(&b.len()).then_with(|| {
            a.iter()
                .zip(b)
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| compare_values(va, vb)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        }),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

fn project(document: &Map<String, Value>, projection: &Projection) -> Value {
    match projection {
        Projection::All => Value::Object(document.clone()),
        Projection::Include(fields) => Value::Object(
            document
                .iter()
                .filter(|(key, _)| fields.iter().any(|field| field.as_str() == key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        Projection::Exclude(fields) => {
            let mut projected = document.clone();
            for field in fields {
                remove_path(&mut projected, field);
            }
            Value::Object(projected)
        }
    }
}

fn remove_path(document: &mut Map<String, Value>, field: &FieldPath) {
    let segments: Vec<&str> = field.segments().collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = document;
    for segment in parents {
        match current.get_mut(*segment).and_then(Value::as_object_mut) {
            Some(next) => current = next,
            None => return,
        }
    }
    current.remove(*last);
}

#[cfg(test)]
mod tests;
