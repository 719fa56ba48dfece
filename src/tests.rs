#![cfg(test)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::PathBuf;

use crate::auth;
use crate::db::{self, DbPool};
use crate::models::article::{Article, ArticleForm};
use crate::models::media::Media;
use crate::models::page::{Page, PageForm};
use crate::models::user::User;
use crate::models::StoreError;
use crate::routes::media::{remove_media, store_media};

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

fn next_test_id() -> u64 {
    TEST_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Create a fresh in-memory SQLite pool with migrations applied.
/// Uses a named shared-cache in-memory DB so multiple pool connections see
/// the same data. Admin seeding is left to the tests that need it.
fn test_pool() -> DbPool {
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", next_test_id());
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    db::run_migrations(&pool).expect("Failed to run migrations");
    pool
}

/// Fast bcrypt hash for test fixtures (cost=4 instead of DEFAULT_COST=12).
fn fast_hash(password: &str) -> String {
    bcrypt::hash(password, 4).unwrap()
}

/// Per-test scratch directory standing in for the upload directory.
fn temp_upload_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "slate_uploads_{}_{}",
        std::process::id(),
        next_test_id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn user_count(pool: &DbPool) -> i64 {
    let conn = pool.get().unwrap();
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap()
}

fn make_article_form(title: &str, status: &str) -> ArticleForm {
    ArticleForm {
        title: title.to_string(),
        content: "<p>body</p>".to_string(),
        author: "admin".to_string(),
        status: status.to_string(),
    }
}

fn make_page_form(title: &str, slug: &str) -> PageForm {
    PageForm {
        title: title.to_string(),
        slug: slug.to_string(),
        content: "<p>body</p>".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════
// Passwords
// ═══════════════════════════════════════════════════════════

#[test]
fn password_verify_roundtrip() {
    let hash = fast_hash("s3cret");
    assert!(auth::verify_password("s3cret", &hash));
    assert!(!auth::verify_password("wrong", &hash));
}

#[test]
fn password_hashes_are_salted() {
    let a = fast_hash("same-password");
    let b = fast_hash("same-password");
    assert_ne!(a, b);
    assert!(auth::verify_password("same-password", &a));
    assert!(auth::verify_password("same-password", &b));
}

#[test]
fn password_verify_rejects_malformed_hash() {
    assert!(!auth::verify_password("anything", "not-a-bcrypt-hash"));
}

// ═══════════════════════════════════════════════════════════
// Tokens
// ═══════════════════════════════════════════════════════════

const SECRET: &str = "unit-test-signing-secret";

#[test]
fn token_roundtrip() {
    let token = auth::issue_token(SECRET, "admin", 24).unwrap();
    let claims = auth::verify_token(SECRET, &token).expect("token should verify");
    assert_eq!(claims.sub, "admin");
    assert!(claims.exp > claims.iat);
}

#[test]
fn token_rejects_wrong_secret() {
    let token = auth::issue_token(SECRET, "admin", 24).unwrap();
    assert!(auth::verify_token("another-secret", &token).is_none());
}

#[test]
fn token_rejects_tampered_signature() {
    let token = auth::issue_token(SECRET, "admin", 24).unwrap();
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });
    assert!(auth::verify_token(SECRET, &tampered).is_none());
}

#[test]
fn token_rejects_tampered_payload() {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let token = auth::issue_token(SECRET, "admin", 24).unwrap();
    let sig = token.rsplit('.').next().unwrap();

    // Re-encode different claims but keep the original signature
    let forged_claims = r#"{"sub":"superuser","iat":0,"exp":99999999999}"#;
    let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(forged_claims), sig);
    assert!(auth::verify_token(SECRET, &forged).is_none());
}

#[test]
fn token_rejects_expired() {
    let token = auth::issue_token(SECRET, "admin", -1).unwrap();
    assert!(auth::verify_token(SECRET, &token).is_none());
}

#[test]
fn token_rejects_garbage() {
    assert!(auth::verify_token(SECRET, "").is_none());
    assert!(auth::verify_token(SECRET, "no-dot-in-here").is_none());
    assert!(auth::verify_token(SECRET, "bad.signature").is_none());
}

#[test]
fn constant_time_eq_basics() {
    assert!(auth::constant_time_eq(b"abc", b"abc"));
    assert!(!auth::constant_time_eq(b"abc", b"abd"));
    assert!(!auth::constant_time_eq(b"abc", b"abcd"));
}

// ═══════════════════════════════════════════════════════════
// Users & admin seed
// ═══════════════════════════════════════════════════════════

#[test]
fn user_create_and_lookup() {
    let pool = test_pool();
    let created = User::create(&pool, "editor", &fast_hash("pw")).unwrap();
    assert!(created.id > 0);

    let fetched = User::get_by_username(&pool, "editor").unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.username, "editor");
    assert_eq!(user_count(&pool), 1);

    assert!(matches!(
        User::get_by_username(&pool, "nobody"),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn user_serialization_excludes_password_hash() {
    let pool = test_pool();
    let user = User::create(&pool, "editor", &fast_hash("pw")).unwrap();
    let value = serde_json::to_value(&user).unwrap();
    assert!(value.get("password_hash").is_none());
    assert_eq!(value.get("username").unwrap(), "editor");
    assert!(value.get("created_at").is_some());
}

#[test]
fn admin_seed_is_idempotent() {
    let pool = test_pool();
    db::seed_admin(&pool, Some("hunter2")).unwrap();
    db::seed_admin(&pool, Some("hunter2")).unwrap();

    assert_eq!(user_count(&pool), 1);
    let admin = User::get_by_username(&pool, db::ADMIN_USERNAME).unwrap();
    assert!(auth::verify_password("hunter2", &admin.password_hash));
}

#[test]
fn admin_seed_falls_back_to_default_password() {
    let pool = test_pool();
    db::seed_admin(&pool, None).unwrap();

    let admin = User::get_by_username(&pool, db::ADMIN_USERNAME).unwrap();
    assert!(auth::verify_password(
        db::DEFAULT_ADMIN_PASSWORD,
        &admin.password_hash
    ));
}

// ═══════════════════════════════════════════════════════════
// Articles
// ═══════════════════════════════════════════════════════════

#[test]
fn article_create_then_get_returns_equal_record() {
    let pool = test_pool();
    let created = Article::create(&pool, &make_article_form("Hello", "published")).unwrap();

    let fetched = Article::find_by_id(&pool, created.id).unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.content, created.content);
    assert_eq!(fetched.author, created.author);
    assert_eq!(fetched.status, created.status);
    assert_eq!(fetched.created_at, created.created_at);
    assert_eq!(fetched.updated_at, created.updated_at);
}

#[test]
fn article_empty_status_defaults_to_draft() {
    let pool = test_pool();
    let created = Article::create(&pool, &make_article_form("Untitled", "")).unwrap();
    assert_eq!(created.status, "draft");
}

#[test]
fn article_update_replaces_fields() {
    let pool = test_pool();
    let created = Article::create(&pool, &make_article_form("Before", "draft")).unwrap();

    let updated = Article::update(&pool, created.id, &make_article_form("After", "published")).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "After");
    assert_eq!(updated.status, "published");
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn article_update_missing_id_is_not_found() {
    let pool = test_pool();
    let result = Article::update(&pool, 5, &make_article_form("Ghost", "draft"));
    assert!(matches!(result, Err(StoreError::NotFound)));
}

#[test]
fn article_delete_then_get_is_not_found() {
    let pool = test_pool();
    let created = Article::create(&pool, &make_article_form("Doomed", "draft")).unwrap();

    Article::delete(&pool, created.id).unwrap();
    assert!(matches!(
        Article::find_by_id(&pool, created.id),
        Err(StoreError::NotFound)
    ));
    // Deleting again reports NotFound, not silent success
    assert!(matches!(
        Article::delete(&pool, created.id),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn article_list_empty_is_empty_vec() {
    let pool = test_pool();
    assert!(Article::list(&pool).unwrap().is_empty());
}

#[test]
fn article_list_newest_first() {
    let pool = test_pool();
    let first = Article::create(&pool, &make_article_form("First", "draft")).unwrap();
    let second = Article::create(&pool, &make_article_form("Second", "draft")).unwrap();
    let third = Article::create(&pool, &make_article_form("Third", "draft")).unwrap();

    let ids: Vec<i64> = Article::list(&pool).unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

// ═══════════════════════════════════════════════════════════
// Pages
// ═══════════════════════════════════════════════════════════

#[test]
fn page_crud() {
    let pool = test_pool();
    let created = Page::create(&pool, &make_page_form("About", "about")).unwrap();

    let fetched = Page::find_by_id(&pool, created.id).unwrap();
    assert_eq!(fetched.slug, "about");
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.created_at, created.created_at);

    let updated = Page::update(&pool, created.id, &make_page_form("About Us", "about-us")).unwrap();
    assert_eq!(updated.title, "About Us");
    assert_eq!(updated.slug, "about-us");
    assert_eq!(updated.created_at, created.created_at);

    Page::delete(&pool, created.id).unwrap();
    assert!(matches!(
        Page::find_by_id(&pool, created.id),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn page_duplicate_slug_is_conflict() {
    let pool = test_pool();
    Page::create(&pool, &make_page_form("About", "about")).unwrap();

    let result = Page::create(&pool, &make_page_form("Another", "about"));
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    // The failed create must not leave a row behind
    assert_eq!(Page::list(&pool).unwrap().len(), 1);
}

#[test]
fn page_update_onto_taken_slug_is_conflict() {
    let pool = test_pool();
    Page::create(&pool, &make_page_form("About", "about")).unwrap();
    let other = Page::create(&pool, &make_page_form("Contact", "contact")).unwrap();

    let result = Page::update(&pool, other.id, &make_page_form("Contact", "about"));
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    // Row is unchanged
    assert_eq!(Page::find_by_id(&pool, other.id).unwrap().slug, "contact");
}

#[test]
fn page_missing_id_is_not_found() {
    let pool = test_pool();
    assert!(matches!(
        Page::find_by_id(&pool, 42),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(Page::delete(&pool, 42), Err(StoreError::NotFound)));
    assert!(matches!(
        Page::update(&pool, 42, &make_page_form("x", "x")),
        Err(StoreError::NotFound)
    ));
}

// ═══════════════════════════════════════════════════════════
// Media
// ═══════════════════════════════════════════════════════════

#[test]
fn media_list_empty_is_empty_vec() {
    let pool = test_pool();
    assert!(Media::list(&pool).unwrap().is_empty());
}

#[test]
fn media_row_roundtrip() {
    let pool = test_pool();
    let created = Media::create(&pool, "abc123.png", "photo.png", "image/png", 2048).unwrap();

    let fetched = Media::find_by_id(&pool, created.id).unwrap();
    assert_eq!(fetched.filename, "abc123.png");
    assert_eq!(fetched.original_name, "photo.png");
    assert_eq!(fetched.mime_type, "image/png");
    assert_eq!(fetched.size, 2048);
    assert_eq!(fetched.created_at, created.created_at);
}

#[test]
fn media_store_then_remove_leaves_no_file_and_no_row() {
    let pool = test_pool();
    let dir = temp_upload_dir();
    let path = dir.join("abc123.png");
    std::fs::write(&path, b"fake image bytes").unwrap();

    let media = store_media(
        &pool,
        dir.to_str().unwrap(),
        "abc123.png",
        "photo.png",
        "image/png",
        16,
    )
    .unwrap();

    remove_media(&pool, dir.to_str().unwrap(), media.id).unwrap();
    assert!(!path.exists());
    assert!(matches!(
        Media::find_by_id(&pool, media.id),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn media_failed_insert_removes_written_file() {
    let pool = test_pool();
    let dir = temp_upload_dir();
    let path = dir.join("orphan.png");
    std::fs::write(&path, b"fake image bytes").unwrap();

    // Sabotage the metadata insert
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("DROP TABLE media;").unwrap();
    }

    let result = store_media(
        &pool,
        dir.to_str().unwrap(),
        "orphan.png",
        "photo.png",
        "image/png",
        16,
    );
    assert!(matches!(result, Err(StoreError::Internal(_))));
    assert!(!path.exists());
}

#[test]
fn media_remove_unknown_id_is_not_found_and_touches_nothing() {
    let pool = test_pool();
    let dir = temp_upload_dir();
    let path = dir.join("keep.png");
    std::fs::write(&path, b"fake image bytes").unwrap();
    let media = Media::create(&pool, "keep.png", "keep.png", "image/png", 16).unwrap();

    let result = remove_media(&pool, dir.to_str().unwrap(), media.id + 100);
    assert!(matches!(result, Err(StoreError::NotFound)));
    assert!(path.exists());
    assert!(Media::find_by_id(&pool, media.id).is_ok());
}

#[test]
fn media_remove_with_missing_file_still_succeeds() {
    let pool = test_pool();
    let dir = temp_upload_dir();
    let media = Media::create(&pool, "gone.png", "gone.png", "image/png", 16).unwrap();

    // No file was ever written at the path; deletion is idempotent
    remove_media(&pool, dir.to_str().unwrap(), media.id).unwrap();
    assert!(matches!(
        Media::find_by_id(&pool, media.id),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn media_list_newest_first() {
    let pool = test_pool();
    let a = Media::create(&pool, "a.png", "a.png", "image/png", 1).unwrap();
    let b = Media::create(&pool, "b.png", "b.png", "image/png", 2).unwrap();

    let ids: Vec<i64> = Media::list(&pool).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}
