use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::Serialize;

use crate::db::DbPool;
use crate::models::StoreError;

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    // Never serialized; the hash must not appear in any response body
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

impl User {
    const SELECT_COLS: &'static str = "id, username, password_hash, created_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn get_by_username(pool: &DbPool, username: &str) -> Result<User, StoreError> {
        let conn = pool.get()?;
        Ok(conn.query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", Self::SELECT_COLS),
            params![username],
            Self::from_row,
        )?)
    }

    pub fn create(pool: &DbPool, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let conn = pool.get()?;
        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", Self::SELECT_COLS),
            params![id],
            Self::from_row,
        )?)
    }
}
