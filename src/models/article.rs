use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::models::StoreError;

#[derive(Debug, Serialize, Clone)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub status: String, // draft or published
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Client payload for create/update. Identifier and timestamps are server
/// assigned and deliberately absent here.
#[derive(Debug, Deserialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub status: String,
}

impl Article {
    const SELECT_COLS: &'static str =
        "id, title, content, author, status, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Article {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get::<_, Option<String>>("content")?.unwrap_or_default(),
            author: row.get::<_, Option<String>>("author")?.unwrap_or_default(),
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn list(pool: &DbPool) -> Result<Vec<Article>, StoreError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM articles ORDER BY created_at DESC, id DESC",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Result<Article, StoreError> {
        let conn = pool.get()?;
        Ok(conn.query_row(
            &format!("SELECT {} FROM articles WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    pub fn create(pool: &DbPool, form: &ArticleForm) -> Result<Article, StoreError> {
        let conn = pool.get()?;
        let status = if form.status.is_empty() {
            "draft"
        } else {
            form.status.as_str()
        };
        conn.execute(
            "INSERT INTO articles (title, content, author, status) VALUES (?1, ?2, ?3, ?4)",
            params![form.title, form.content, form.author, status],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            &format!("SELECT {} FROM articles WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    /// Full replacement of the mutable fields. `id` and `created_at` never
    /// change; `updated_at` is refreshed by the statement itself.
    pub fn update(pool: &DbPool, id: i64, form: &ArticleForm) -> Result<Article, StoreError> {
        let conn = pool.get()?;
        let affected = conn.execute(
            "UPDATE articles SET title = ?1, content = ?2, author = ?3, status = ?4,
             updated_at = CURRENT_TIMESTAMP WHERE id = ?5",
            params![form.title, form.content, form.author, form.status, id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(conn.query_row(
            &format!("SELECT {} FROM articles WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), StoreError> {
        let conn = pool.get()?;
        let affected = conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
