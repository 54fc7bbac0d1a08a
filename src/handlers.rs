//! Generic resource handlers
//!
//! A [`Resource`] binds one collection to a [`DocumentStore`] and offers the
//! five standard operations. List requests run the full query pipeline.

use crate::errors::AppError;
use crate::response::ApiResponse;
use config::QueryConfig;
use document_store::DocumentStore;
use query_features::{ListQuery, QueryAlias, QueryFeatures, QueryFilter, RawParameterMap};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct Resource {
    collection: String,
    store: Arc<dyn DocumentStore>,
    config: Arc<QueryConfig>,
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("collection", &self.collection)
            .finish()
    }
}

impl Resource {
    pub fn new(
        collection: impl Into<String>,
        store: Arc<dyn DocumentStore>,
        config: Arc<QueryConfig>,
    ) -> Self {
        Self {
            collection: collection.into(),
            store,
            config,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Compile request parameters into a list query
    ///
    /// `base_filters` are scoping conditions from the caller, such as the
    /// parent id of a nested route. They are always kept.
    pub fn list_query(&self, base_filters: Vec<QueryFilter>, params: RawParameterMap) -> ListQuery {
        let base = ListQuery::new(self.collection.as_str()).filters(base_filters);
        QueryFeatures::new(base, params, &self.config).all().build()
    }

    pub async fn get_all(
        &self,
        base_filters: Vec<QueryFilter>,
        params: RawParameterMap,
    ) -> Result<ApiResponse, AppError> {
        let query = self.list_query(base_filters, params);
        let documents = self.store.find(&query).await?;

        crate::debug_log!(
            "get_all on {} returned {} documents",
            self.collection,
            documents.len()
        );
        Ok(ApiResponse::list(&self.collection, documents))
    }

    /// List through a preset that overrides the request's reserved keys
    pub async fn get_all_with_alias(
        &self,
        alias: &QueryAlias,
        base_filters: Vec<QueryFilter>,
        mut params: RawParameterMap,
    ) -> Result<ApiResponse, AppError> {
        alias.apply(&mut params);
        self.get_all(base_filters, params).await
    }

    /// Number of documents matching the request filters, ignoring the page window
    pub async fn count(
        &self,
        base_filters: Vec<QueryFilter>,
        params: RawParameterMap,
    ) -> Result<u64, AppError> {
        let base = ListQuery::new(self.collection.as_str()).filters(base_filters);
        let query = QueryFeatures::new(base, params, &self.config)
            .filter()
            .build();

        Ok(self.store.count(&query).await?)
    }

    pub async fn get_one(&self, id: &str) -> Result<ApiResponse, AppError> {
        match self.store.find_by_id(&self.collection, id).await? {
            Some(document) => Ok(ApiResponse::ok(document)),
            None => Err(AppError::not_found(id)),
        }
    }

    pub async fn create_one(&self, document: Value) -> Result<ApiResponse, AppError> {
        let created = self.store.insert(&self.collection, document).await?;
        Ok(ApiResponse::created(created))
    }

    /// Shallow-merge `patch` into the stored document
    pub async fn update_one(&self, id: &str, patch: Value) -> Result<ApiResponse, AppError> {
        let Value::Object(changes) = patch else {
            return Err(AppError::bad_request(
                "Invalid input data. Updates must be JSON objects",
            ));
        };

        match self.store.update_by_id(&self.collection, id, changes).await? {
            Some(updated) => Ok(ApiResponse::ok(updated)),
            None => Err(AppError::not_found(id)),
        }
    }

    pub async fn delete_one(&self, id: &str) -> Result<ApiResponse, AppError> {
        if self.store.delete_by_id(&self.collection, id).await? {
            Ok(ApiResponse::no_content())
        } else {
            Err(AppError::not_found(id))
        }
    }
}

/// Turn a handler result into the envelope sent to the client
pub fn respond(result: Result<ApiResponse, AppError>) -> ApiResponse {
    result.unwrap_or_else(AppError::into_response)
}
