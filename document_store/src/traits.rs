use crate::errors::StoreError;
use async_trait::async_trait;
use query_features::ListQuery;
use serde_json::{Map, Value};

/// Executor for list queries and single-document operations
///
/// Documents are JSON objects identified by the configured id field.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document, returning it with identity and timestamps filled in
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError>;

    /// Run a list query
    async fn find(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError>;

    /// Number of documents matching the query conditions, ignoring sort, projection and window
    async fn count(&self, query: &ListQuery) -> Result<u64, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Shallow-merge `changes` into a document, returning the updated document
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Returns whether a document was deleted
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}
