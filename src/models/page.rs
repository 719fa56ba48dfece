use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::models::StoreError;

#[derive(Debug, Serialize, Clone)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
}

impl Page {
    const SELECT_COLS: &'static str = "id, title, slug, content, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Page {
            id: row.get("id")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            content: row.get::<_, Option<String>>("content")?.unwrap_or_default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn list(pool: &DbPool) -> Result<Vec<Page>, StoreError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pages ORDER BY created_at DESC, id DESC",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Result<Page, StoreError> {
        let conn = pool.get()?;
        Ok(conn.query_row(
            &format!("SELECT {} FROM pages WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    /// Insert a new page. A taken slug surfaces as `StoreError::Conflict`
    /// via the UNIQUE constraint, in which case no row is written.
    pub fn create(pool: &DbPool, form: &PageForm) -> Result<Page, StoreError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO pages (title, slug, content) VALUES (?1, ?2, ?3)",
            params![form.title, form.slug, form.content],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            &format!("SELECT {} FROM pages WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    pub fn update(pool: &DbPool, id: i64, form: &PageForm) -> Result<Page, StoreError> {
        let conn = pool.get()?;
        let affected = conn.execute(
            "UPDATE pages SET title = ?1, slug = ?2, content = ?3,
             updated_at = CURRENT_TIMESTAMP WHERE id = ?4",
            params![form.title, form.slug, form.content, id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(conn.query_row(
            &format!("SELECT {} FROM pages WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), StoreError> {
        let conn = pool.get()?;
        let affected = conn.execute("DELETE FROM pages WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
