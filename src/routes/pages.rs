use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::parse_id;
use crate::auth::ApiUser;
use crate::db::DbPool;
use crate::errors::{map_store, ApiError};
use crate::models::page::{Page, PageForm};
use crate::models::StoreError;

/// Pages are the one store with a uniqueness invariant, so the conflict
/// arm gets a slug-specific message.
fn page_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Conflict(_) => ApiError::Conflict("Page slug already exists".to_string()),
        other => map_store("Page")(other),
    }
}

#[get("/pages")]
pub fn list_pages(_user: ApiUser, pool: &State<DbPool>) -> Result<Json<Vec<Page>>, ApiError> {
    Page::list(pool).map(Json).map_err(page_error)
}

#[get("/pages/<id>")]
pub fn get_page(_user: ApiUser, pool: &State<DbPool>, id: &str) -> Result<Json<Page>, ApiError> {
    let id = parse_id(id, "page")?;
    Page::find_by_id(pool, id).map(Json).map_err(page_error)
}

#[post("/pages", data = "<form>")]
pub fn create_page(
    _user: ApiUser,
    pool: &State<DbPool>,
    form: Json<PageForm>,
) -> Result<Created<Json<Page>>, ApiError> {
    let page = Page::create(pool, &form).map_err(page_error)?;
    let location = format!("/api/pages/{}", page.id);
    Ok(Created::new(location).body(Json(page)))
}

#[put("/pages/<id>", data = "<form>")]
pub fn update_page(
    _user: ApiUser,
    pool: &State<DbPool>,
    id: &str,
    form: Json<PageForm>,
) -> Result<Json<Page>, ApiError> {
    let id = parse_id(id, "page")?;
    Page::update(pool, id, &form).map(Json).map_err(page_error)
}

#[delete("/pages/<id>")]
pub fn delete_page(
    _user: ApiUser,
    pool: &State<DbPool>,
    id: &str,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(id, "page")?;
    Page::delete(pool, id).map_err(page_error)?;
    Ok(Json(json!({ "message": "Page deleted" })))
}
