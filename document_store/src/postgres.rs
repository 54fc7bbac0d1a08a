//! PostgreSQL document store
//!
//! One table per collection, shaped `(id TEXT PRIMARY KEY, doc JSONB NOT NULL)`.

use crate::document::{prepare_insert, sanitize_changes, NewDocument};
use crate::errors::StoreError;
use crate::traits::DocumentStore;
use crate::DbPool;
use async_trait::async_trait;
use config::QueryConfig;
use query_features::{ListQuery, SqlParam, ValidatedTableName};
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

const UNIQUE_VIOLATION: &str = "23505";
const UNDEFINED_TABLE: &str = "42P01";
const DUPLICATE_TABLE: &str = "42P07";

#[derive(Clone)]
pub struct PgDocumentStore {
    db_pool: DbPool,
    config: QueryConfig,
}

impl std::fmt::Debug for PgDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDocumentStore")
            .field("pool_size", &self.db_pool.size())
            .field("id_field", &self.config.id_field)
            .finish()
    }
}

impl PgDocumentStore {
    pub fn new(db_pool: DbPool, config: QueryConfig) -> Self {
        Self { db_pool, config }
    }

    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }

    /// Create the backing table for a collection if it does not exist yet
    ///
    /// Losing a creation race to another session counts as success.
    pub async fn ensure_collection(&self, collection: &str) -> Result<(), StoreError> {
        let table = ValidatedTableName::new(collection)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, doc JSONB NOT NULL)",
            table
        );

        match sqlx::query(&sql).execute(&self.db_pool).await {
            Ok(_) => {}
            Err(e) if created_concurrently(error_code(&e).as_deref()) => {
                query_features::debug_log!("Collection table {} was created concurrently", table);
            }
            Err(e) => return Err(e.into()),
        }
        query_features::debug_log!("Ensured collection table {}", table);
        Ok(())
    }

    async fn insert_row(
        &self,
        table: &ValidatedTableName,
        id: &str,
        doc: &Value,
    ) -> Result<PgRow, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2::jsonb) RETURNING doc",
            table
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(doc)
            .fetch_one(&self.db_pool)
            .await
    }

    /// Drop a collection table, used to reset state
    pub async fn drop_collection(&self, collection: &str) -> Result<(), StoreError> {
        let table = ValidatedTableName::new(collection)?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&self.db_pool)
            .await?;
        Ok(())
    }
}

fn bind_params(
    query: Query<'_, Postgres, PgArguments>,
    params: Vec<SqlParam>,
) -> Query<'_, Postgres, PgArguments> {
    params.into_iter().fold(query, |query, param| match param {
        SqlParam::Json(value) => query.bind(value),
        SqlParam::TextArray(values) => query.bind(values),
    })
}

fn error_code(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// A collection that was never written to reads as empty
fn is_missing_collection(error: &sqlx::Error) -> bool {
    error_code(error).as_deref() == Some(UNDEFINED_TABLE)
}

/// `CREATE TABLE IF NOT EXISTS` is not atomic: a concurrent create of the
/// same table fails on the catalog's unique index or as a duplicate table
fn created_concurrently(code: Option<&str>) -> bool {
    matches!(code, Some(UNIQUE_VIOLATION) | Some(DUPLICATE_TABLE))
}

fn decode_doc(row: &PgRow) -> Result<Value, StoreError> {
    Ok(row.try_get::<Value, _>("doc")?)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let table = ValidatedTableName::new(collection)?;
        let NewDocument { id, body } = prepare_insert(document, &self.config)?;
        let doc = Value::Object(body);

        // the table is created on the first write only
        let inserted = match self.insert_row(&table, &id, &doc).await {
            Err(e) if is_missing_collection(&e) => {
                self.ensure_collection(collection).await?;
                self.insert_row(&table, &id, &doc).await
            }
            other => other,
        };

        let row = inserted.map_err(|e| {
            if error_code(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                StoreError::DuplicateKey {
                    field: self.config.id_field.clone(),
                    value: id.clone(),
                }
            } else {
                StoreError::Database(e)
            }
        })?;

        decode_doc(&row)
    }

    async fn find(&self, query: &ListQuery) -> Result<Vec<Value>, StoreError> {
        let table = ValidatedTableName::new(query.collection())?;
        let (sql, params) = query.build_select(&table);
        query_features::trace_log!("find: {}", sql);

        let rows = match bind_params(sqlx::query(&sql), params)
            .fetch_all(&self.db_pool)
            .await
        {
            Ok(rows) => rows,
            Err(e) if is_missing_collection(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        rows.iter().map(decode_doc).collect()
    }

    async fn count(&self, query: &ListQuery) -> Result<u64, StoreError> {
        let table = ValidatedTableName::new(query.collection())?;
        let (sql, params) = query.build_count(&table);
        query_features::trace_log!("count: {}", sql);

        let row = match bind_params(sqlx::query(&sql), params)
            .fetch_one(&self.db_pool)
            .await
        {
            Ok(row) => row,
            Err(e) if is_missing_collection(&e) => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let table = ValidatedTableName::new(collection)?;
        let sql = format!("SELECT doc FROM {} WHERE id = $1", table);

        match sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
        {
            Ok(row) => row.as_ref().map(decode_doc).transpose(),
            Err(e) if is_missing_collection(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let table = ValidatedTableName::new(collection)?;
        let changes = sanitize_changes(changes, &self.config);
        let sql = format!(
            "UPDATE {} SET doc = doc || $2::jsonb WHERE id = $1 RETURNING doc",
            table
        );

        match sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(changes))
            .fetch_optional(&self.db_pool)
            .await
        {
            Ok(row) => row.as_ref().map(decode_doc).transpose(),
            Err(e) if is_missing_collection(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let table = ValidatedTableName::new(collection)?;
        let sql = format!("DELETE FROM {} WHERE id = $1", table);

        match sqlx::query(&sql).bind(id).execute(&self.db_pool).await {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(e) if is_missing_collection(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
