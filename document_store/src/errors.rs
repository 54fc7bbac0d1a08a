use query_features::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid collection name: {0}")]
    InvalidCollection(#[from] ValidationError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Duplicate key: {field} = {value}")]
    DuplicateKey { field: String, value: String },
}

impl StoreError {
    /// Whether the error is caused by the request rather than the store
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::Database(_))
    }
}
