use log::{info, warn};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::models::user::User;
use crate::models::StoreError;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Reserved administrator account, provisioned on first startup.
pub const ADMIN_USERNAME: &str = "admin";

/// Documented weak default used when ADMIN_PASSWORD is unset. Deliberate:
/// a first-boot install must be able to log in before any configuration.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub fn init_pool(db_path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::file(db_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Accounts
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Articles
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT,
            author TEXT,
            status TEXT DEFAULT 'draft',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Static pages, addressed elsewhere by slug
        CREATE TABLE IF NOT EXISTS pages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            content TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Uploaded media metadata; the bytes live in the upload directory
        CREATE TABLE IF NOT EXISTS media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            original_name TEXT NOT NULL,
            mime_type TEXT,
            size INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;

    Ok(())
}

/// Ensure the administrator account exists. Check-then-insert is safe for a
/// single-process startup; running it again is a no-op.
pub fn seed_admin(pool: &DbPool, password: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match User::get_by_username(pool, ADMIN_USERNAME) {
        Ok(_) => return Ok(()),
        Err(StoreError::NotFound) => {}
        Err(e) => return Err(Box::new(e)),
    }

    let password = match password {
        Some(p) => p,
        None => {
            warn!(
                "ADMIN_PASSWORD not set; seeding '{}' with the default password, change it",
                ADMIN_USERNAME
            );
            DEFAULT_ADMIN_PASSWORD
        }
    };

    let hash = crate::auth::hash_password(password)?;
    User::create(pool, ADMIN_USERNAME, &hash)?;

    info!("Created administrator account '{}'", ADMIN_USERNAME);
    Ok(())
}
