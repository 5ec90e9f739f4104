//! Postgres-backed document store.
//!
//! Documents live in a single `documents` table as JSONB, keyed by
//! `(collection, key)`. Merge writes use JSONB concatenation (`||`), which replaces
//! top-level fields present in the write and keeps the others.

use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::r#trait::{Document, DocumentStore, StoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    key TEXT NOT NULL,
    body JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, key)
)
"#;

/// Postgres document store bound to one collection.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
    collection: String,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }

    /// Connect, create the table when missing, and bind to `collection`.
    pub async fn connect(database_url: &str, collection: impl Into<String>) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let store = Self::new(pool, collection);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT key, body
            FROM documents
            WHERE collection = $1
            ORDER BY key
            "#,
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<(String, Document), StoreError> {
                let key: String = row.try_get("key")?;
                let Json(body): Json<Document> = row.try_get("body")?;
                Ok((key, body))
            })
            .collect()
    }

    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND key = $2
            "#,
        )
        .bind(&self.collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let Json(body): Json<Document> = row.try_get("body")?;
                Ok(Some(body))
            }
            None => Ok(None),
        }
    }

    async fn upsert_merge(&self, key: &str, fields: Document) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET
                body = documents.body || EXCLUDED.body,
                updated_at = NOW()
            "#,
        )
        .bind(&self.collection)
        .bind(key)
        .bind(Json(fields))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(&self.collection)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
