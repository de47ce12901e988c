//! # Cairn Storage - SQLite Backend
//!
//! SQLite implementation of the document store. Documents are kept as JSON
//! text in a single table and filtered with SQLite's JSON functions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use cairn_storage::{
    check_query, validate_collection_name, Document, DocumentId, DocumentStore, Filter, ItemList,
    StorageError,
};

/// SQLite-backed document store.
///
/// Each store is one database file at `{base_path}/{name}.db`.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteDocumentStore {
    /// Opens or creates the database `name` under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database name is invalid
    /// - Directory cannot be created
    /// - Database connection fails
    pub async fn open(base_path: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        Self::validate_db_name(name)?;

        let base = base_path.as_ref();
        std::fs::create_dir_all(base).map_err(|e| {
            StorageError::ConnectionFailed(format!("failed to create directory: {e}"))
        })?;

        let db_path = base.join(format!("{name}.db"));
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        debug!(name = %name, path = %db_path.display(), "Opening SQLite database");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let store = Self { pool, db_path };

        store.migrate().await?;

        info!(name = %name, "SQLite document store ready");

        Ok(store)
    }

    /// Returns the path of the database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Validates that a database name is safe to use as a file name.
    ///
    /// Only allows: lowercase letters, digits, underscore, hyphen.
    fn validate_db_name(name: &str) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidInput(
                "database name cannot be empty".into(),
            ));
        }

        if name.len() > 64 {
            return Err(StorageError::InvalidInput("database name too long".into()));
        }

        let valid = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !valid {
            return Err(StorageError::InvalidInput(
                "database name must match [a-z0-9_-]+".into(),
            ));
        }

        Ok(())
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StorageError> {
        debug!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name       TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::ConnectionFailed(format!("migration failed: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                body       TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::ConnectionFailed(format!("migration failed: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection)")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("migration failed: {e}")))?;

        debug!("Migrations complete");

        Ok(())
    }

    /// Returns the current Unix timestamp.
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }

    /// Returns the names of all existing collections, sorted.
    pub async fn collection_names(&self) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM collections ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(rows.into_iter().map(|(n,)| n).collect())
    }
}

/// Builds the `WHERE` clause and its parameters for a filtered query.
///
/// Field equality is evaluated by SQLite: both the stored field and the
/// expected value go through `json_extract`, and their `json_type` must
/// agree, so `true` never matches `1` and `1` never matches `"1"`.
fn where_clause(collection: &str, filter: &Filter) -> Result<(String, Vec<String>), StorageError> {
    let mut sql = String::from("collection = ?");
    let mut params = vec![collection.to_string()];

    for (field, value) in filter.conditions() {
        let path = format!("$.\"{field}\"");
        if value.is_null() {
            sql.push_str(" AND json_type(body, ?) = 'null'");
            params.push(path);
        } else {
            let expected = serde_json::to_string(value)?;
            sql.push_str(concat!(
                " AND json_type(body, ?) = json_type(?, '$')",
                " AND json_extract(body, ?) = json_extract(?, '$')",
            ));
            params.push(path.clone());
            params.push(expected.clone());
            params.push(path);
            params.push(expected);
        }
    }

    Ok((sql, params))
}

fn decode(body: &str) -> Result<Document, StorageError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(StorageError::Serialization(
            "stored document is not a JSON object".into(),
        )),
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn ensure_collection(&self, collection: &str) -> Result<(), StorageError> {
        validate_collection_name(collection)?;

        sqlx::query("INSERT OR IGNORE INTO collections (name, created_at) VALUES (?, ?)")
            .bind(collection)
            .bind(Self::now())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        page_size: u32,
    ) -> Result<ItemList, StorageError> {
        let offset = check_query(collection, filter, page, page_size)?;
        let (where_sql, params) = where_clause(collection, filter)?;

        let count_sql = format!("SELECT COUNT(*) FROM documents WHERE {where_sql}");
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        for p in &params {
            count_query = count_query.bind(p.as_str());
        }
        let (total,) = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let page_sql =
            format!("SELECT body FROM documents WHERE {where_sql} ORDER BY id LIMIT ? OFFSET ?");
        let mut page_query = sqlx::query_as::<_, (String,)>(&page_sql);
        for p in &params {
            page_query = page_query.bind(p.as_str());
        }
        let rows = page_query
            .bind(i64::from(page_size))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let items = rows
            .iter()
            .map(|(body,)| decode(body))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ItemList {
            total_count: u64::try_from(total).unwrap_or_default(),
            items,
        })
    }

    async fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<DocumentId, StorageError> {
        validate_collection_name(collection)?;

        let body = serde_json::to_string(&document)?;
        let now = Self::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO collections (name, created_at) VALUES (?, ?)")
            .bind(collection)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let result =
            sqlx::query("INSERT INTO documents (collection, body, created_at) VALUES (?, ?, ?)")
                .bind(collection)
                .bind(&body)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        let id = DocumentId(result.last_insert_rowid());
        debug!(collection = %collection, id = id.0, "Inserted document");

        Ok(id)
    }
}
