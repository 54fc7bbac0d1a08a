//! Document helpers shared by the store implementations

use crate::errors::StoreError;
use chrono::{SecondsFormat, Utc};
use config::QueryConfig;
use serde_json::{Map, Value};
use uuid::Uuid;

/// A document ready to be written, with its identity extracted
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub id: String,
    pub body: Map<String, Value>,
}

/// Creation timestamp in a format whose text order is chronological
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Stamp identity, creation time and version on a new document
///
/// Caller-supplied `_id` and `createdAt` values are kept, the id must be a string.
pub fn prepare_insert(document: Value, config: &QueryConfig) -> Result<NewDocument, StoreError> {
    let Value::Object(mut body) = document else {
        return Err(StoreError::InvalidDocument(
            "documents must be JSON objects".to_string(),
        ));
    };

    let id = match body.get(&config.id_field) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::String(_)) | None => {
            let id = Uuid::new_v4().to_string();
            body.insert(config.id_field.clone(), Value::String(id.clone()));
            id
        }
        Some(other) => {
            return Err(StoreError::InvalidDocument(format!(
                "{} must be a string, got {}",
                config.id_field, other
            )))
        }
    };

    body.entry(config.created_at_field.clone())
        .or_insert_with(|| Value::String(timestamp_now()));
    body.entry(config.version_field.clone())
        .or_insert_with(|| Value::from(0));

    Ok(NewDocument { id, body })
}

/// Drop the fields an update may never change
pub fn sanitize_changes(mut changes: Map<String, Value>, config: &QueryConfig) -> Map<String, Value> {
    if changes.remove(&config.id_field).is_some() {
        tracing::warn!(field = %config.id_field, "Ignoring identity change in update");
    }
    changes
}
