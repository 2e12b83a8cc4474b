//! SQLite-backed repository implementations.
//!
//! The durable store is a single-file database with two tables: `contents`
//! (page id, content, optional unique share token) and `burns` (single-use
//! notes). Queries use the runtime API; the schema is bootstrapped with
//! idempotent DDL at startup.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::application::repos::{BurnRepo, PagesRepo, RepoError};
use crate::domain::entities::{BurnNoteRecord, PageRecord};

/// Map a sqlx error onto the repository error space, surfacing uniqueness
/// violations distinctly so the allocator backstop can act on them.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepoError::duplicate(db_err.message().to_string());
        }
    }
    RepoError::persistence(err.to_string())
}

#[derive(sqlx::FromRow)]
struct PageRow {
    id: String,
    content: String,
    share_id: Option<String>,
}

impl From<PageRow> for PageRecord {
    fn from(row: PageRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            share_id: row.share_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BurnRow {
    burn_id: String,
    content: String,
}

impl From<BurnRow> for BurnNoteRecord {
    fn from(row: BurnRow) -> Self {
        Self {
            burn_id: row.burn_id,
            content: row.content,
        }
    }
}

#[derive(Clone)]
pub struct SqliteRepositories {
    pool: SqlitePool,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(path: &Path, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
    }

    pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS contents (\
                 id TEXT PRIMARY KEY,\
                 content TEXT NOT NULL,\
                 share_id TEXT UNIQUE\
             )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS burns (\
                 burn_id TEXT PRIMARY KEY,\
                 content TEXT NOT NULL\
             )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Seed an initial row, ignoring it when the id is already present.
    pub async fn seed_page(&self, id: &str, content: &str) -> Result<(), RepoError> {
        sqlx::query("INSERT OR IGNORE INTO contents (id, content) VALUES (?1, ?2)")
            .bind(id)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl PagesRepo for SqliteRepositories {
    async fn fetch_page(&self, id: &str) -> Result<Option<PageRecord>, RepoError> {
        let row = sqlx::query_as::<_, PageRow>(
            "SELECT id, content, share_id FROM contents WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PageRecord::from))
    }

    async fn upsert_content(&self, id: &str, content: &str) -> Result<(), RepoError> {
        // Update first; insert only when no row was affected. The unique
        // primary key catches the insert losing a race with another writer.
        let updated = sqlx::query("UPDATE contents SET content = ?2 WHERE id = ?1")
            .bind(id)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if updated.rows_affected() == 0 {
            sqlx::query("INSERT INTO contents (id, content) VALUES (?1, ?2)")
                .bind(id)
                .bind(content)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }

        Ok(())
    }

    async fn assign_share_id(&self, id: &str, share_id: &str) -> Result<(), RepoError> {
        let updated = sqlx::query(
            "UPDATE contents SET share_id = ?2 WHERE id = ?1 AND share_id IS NULL",
        )
        .bind(id)
        .bind(share_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if updated.rows_affected() == 0 {
            return Err(RepoError::persistence(format!(
                "page `{id}` missing or share token already assigned"
            )));
        }

        Ok(())
    }

    async fn share_id_exists(&self, share_id: &str) -> Result<bool, RepoError> {
        let row = sqlx::query("SELECT 1 FROM contents WHERE share_id = ?1")
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.is_some())
    }

    async fn scan_pages(&self) -> Result<Vec<PageRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PageRow>("SELECT id, content, share_id FROM contents")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PageRecord::from).collect())
    }
}

#[async_trait]
impl BurnRepo for SqliteRepositories {
    async fn insert_burn(&self, burn_id: &str, content: &str) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO burns (burn_id, content) VALUES (?1, ?2)")
            .bind(burn_id)
            .bind(content)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_burn(&self, burn_id: &str) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM burns WHERE burn_id = ?1")
            .bind(burn_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn burn_id_exists(&self, burn_id: &str) -> Result<bool, RepoError> {
        let row = sqlx::query("SELECT 1 FROM burns WHERE burn_id = ?1")
            .bind(burn_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.is_some())
    }

    async fn scan_burns(&self) -> Result<Vec<BurnNoteRecord>, RepoError> {
        let rows = sqlx::query_as::<_, BurnRow>("SELECT burn_id, content FROM burns")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BurnNoteRecord::from).collect())
    }
}
