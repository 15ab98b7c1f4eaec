//! PostgreSQL backend: each collection is a table of JSONB documents
//! (`id BIGSERIAL PRIMARY KEY, doc JSONB NOT NULL`) in the schema named by
//! `RECORDS_SCHEMA` (default `records`).

use super::{with_id, Document, DocumentStore};
use crate::error::StoreError;
use crate::model::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

pub const DEFAULT_SCHEMA: &str = "records";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    /// Wraps an existing pool. Tables must already exist (see [`ensure_collection_tables`]).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Creates the database if missing, connects, and creates the collection tables.
    pub async fn connect(database_url: &str, schema: &str) -> Result<Self, StoreError> {
        ensure_database_exists(database_url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        ensure_collection_tables(&pool, schema).await?;
        tracing::info!(schema = %schema, "postgres store ready");
        Ok(Self::new(pool, schema))
    }

    fn table(&self, kind: EntityKind) -> String {
        qualified_table(&self.schema, kind)
    }
}

fn qualified_table(schema: &str, kind: EntityKind) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(kind.collection()))
}

fn row_to_document(kind: EntityKind, id: i64, doc: Value) -> Result<Document, StoreError> {
    match doc {
        Value::Object(fields) => Ok(with_id(id, fields)),
        other => Err(StoreError::Corrupt {
            collection: kind.collection(),
            message: format!("row {} holds non-object document {}", id, other),
        }),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Document>, StoreError> {
        let sql = format!("SELECT id, doc FROM {} ORDER BY id", self.table(kind));
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<(i64, Value)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|(id, doc)| row_to_document(kind, id, doc))
            .collect()
    }

    async fn get(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError> {
        let sql = format!("SELECT id, doc FROM {} WHERE id = $1", self.table(kind));
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<(i64, Value)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(id, doc)| row_to_document(kind, id, doc)).transpose()
    }

    async fn insert(&self, kind: EntityKind, mut fields: Document) -> Result<Document, StoreError> {
        fields.remove("id");
        let sql = format!(
            "INSERT INTO {} (doc) VALUES ($1) RETURNING id, doc",
            self.table(kind)
        );
        tracing::debug!(sql = %sql, "query");
        let (id, doc): (i64, Value) = sqlx::query_as(&sql)
            .bind(Value::Object(fields))
            .fetch_one(&self.pool)
            .await?;
        row_to_document(kind, id, doc)
    }

    async fn replace(
        &self,
        kind: EntityKind,
        id: i64,
        mut fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        fields.remove("id");
        let sql = format!(
            "UPDATE {} SET doc = $2 WHERE id = $1 RETURNING id, doc",
            self.table(kind)
        );
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<(i64, Value)> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Value::Object(fields))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(id, doc)| row_to_document(kind, id, doc)).transpose()
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> Result<Option<Document>, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING id, doc", self.table(kind));
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<(i64, Value)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(id, doc)| row_to_document(kind, id, doc)).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Create `schema` if not exists, then one document table per collection.
pub async fn ensure_collection_tables(pool: &PgPool, schema: &str) -> Result<(), StoreError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .execute(pool)
        .await?;
    for kind in EntityKind::ALL {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                doc JSONB NOT NULL
            )
            "#,
            qualified_table(schema, kind)
        );
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Connects to the server's `postgres` database and creates the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let scheme_end = url
        .find("://")
        .ok_or_else(|| StoreError::InvalidUrl("missing scheme".into()))?
        + 3;
    let path_start = url[scheme_end..]
        .find('/')
        .map(|i| i + scheme_end + 1)
        .ok_or_else(|| StoreError::InvalidUrl("no path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
