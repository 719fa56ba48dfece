use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::Serialize;

use crate::db::DbPool;
use crate::models::StoreError;

/// Metadata row for one uploaded file. `filename` is the server-generated
/// name under the upload directory; `original_name` is what the client sent.
#[derive(Debug, Serialize, Clone)]
pub struct Media {
    pub id: i64,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: NaiveDateTime,
}

impl Media {
    const SELECT_COLS: &'static str = "id, filename, original_name, mime_type, size, created_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Media {
            id: row.get("id")?,
            filename: row.get("filename")?,
            original_name: row.get("original_name")?,
            mime_type: row.get::<_, Option<String>>("mime_type")?.unwrap_or_default(),
            size: row.get::<_, Option<i64>>("size")?.unwrap_or(0),
            created_at: row.get("created_at")?,
        })
    }

    pub fn list(pool: &DbPool) -> Result<Vec<Media>, StoreError> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM media ORDER BY created_at DESC, id DESC",
            Self::SELECT_COLS
        ))?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Result<Media, StoreError> {
        let conn = pool.get()?;
        Ok(conn.query_row(
            &format!("SELECT {} FROM media WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    pub fn create(
        pool: &DbPool,
        filename: &str,
        original_name: &str,
        mime_type: &str,
        size: i64,
    ) -> Result<Media, StoreError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO media (filename, original_name, mime_type, size) VALUES (?1, ?2, ?3, ?4)",
            params![filename, original_name, mime_type, size],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            &format!("SELECT {} FROM media WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }

    /// Delete the row and return the stored filename so the caller can
    /// remove the backing file. A missing row leaves nothing touched.
    pub fn delete(pool: &DbPool, id: i64) -> Result<String, StoreError> {
        let conn = pool.get()?;
        let filename: String = conn.query_row(
            "SELECT filename FROM media WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        let affected = conn.execute("DELETE FROM media WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(filename)
    }
}
