//! Response envelope
//!
//! Every handler answers with `{ status, results?, data?, message? }` and a
//! status code. A `204` carries no body at all.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    #[serde(skip)]
    status_code: u16,
    status: ApiStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ApiResponse {
    fn success(status_code: u16, results: Option<usize>, data: Option<Value>) -> Self {
        Self {
            status_code,
            status: ApiStatus::Success,
            results,
            data,
            message: None,
        }
    }

    /// `200` with a list keyed by collection name
    pub fn list(collection: &str, documents: Vec<Value>) -> Self {
        let results = documents.len();
        let mut data = Map::new();
        data.insert(collection.to_string(), Value::Array(documents));
        Self::success(200, Some(results), Some(Value::Object(data)))
    }

    pub fn ok(document: Value) -> Self {
        Self::success(200, None, Some(document))
    }

    pub fn created(document: Value) -> Self {
        Self::success(201, None, Some(document))
    }

    pub fn no_content() -> Self {
        Self::success(204, None, None)
    }

    pub fn error(status_code: u16, status: ApiStatus, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status,
            results: None,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status(&self) -> ApiStatus {
        self.status
    }

    pub fn results(&self) -> Option<usize> {
        self.results
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// JSON body, `None` for `204 No Content`
    pub fn body(&self) -> Option<Value> {
        if self.status_code == 204 {
            return None;
        }
        serde_json::to_value(self).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_envelope() {
        let response = ApiResponse::list("tours", vec![json!({ "name": "a" }), json!({ "name": "b" })]);

        assert_eq!(response.status_code(), 200);
        assert_eq!(
            response.body(),
            Some(json!({
                "status": "success",
                "results": 2,
                "data": { "tours": [{ "name": "a" }, { "name": "b" }] }
            }))
        );
    }

    #[test]
    fn test_single_document_has_no_results_count() {
        let body = ApiResponse::created(json!({ "_id": "t1" })).body().unwrap();
        assert_eq!(body, json!({ "status": "success", "data": { "_id": "t1" } }));
    }

    #[test]
    fn test_no_content_has_no_body() {
        let response = ApiResponse::no_content();
        assert_eq!(response.status_code(), 204);
        assert!(response.body().is_none());
    }

    #[test]
    fn test_error_envelope() {
        let body = ApiResponse::error(404, ApiStatus::Fail, "No document found with id : x")
            .body()
            .unwrap();
        assert_eq!(
            body,
            json!({ "status": "fail", "message": "No document found with id : x" })
        );
    }
}
