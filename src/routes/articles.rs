use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use super::parse_id;
use crate::auth::ApiUser;
use crate::db::DbPool;
use crate::errors::{map_store, ApiError};
use crate::models::article::{Article, ArticleForm};

#[get("/articles")]
pub fn list_articles(_user: ApiUser, pool: &State<DbPool>) -> Result<Json<Vec<Article>>, ApiError> {
    Article::list(pool).map(Json).map_err(map_store("Article"))
}

#[get("/articles/<id>")]
pub fn get_article(
    _user: ApiUser,
    pool: &State<DbPool>,
    id: &str,
) -> Result<Json<Article>, ApiError> {
    let id = parse_id(id, "article")?;
    Article::find_by_id(pool, id)
        .map(Json)
        .map_err(map_store("Article"))
}

#[post("/articles", data = "<form>")]
pub fn create_article(
    _user: ApiUser,
    pool: &State<DbPool>,
    form: Json<ArticleForm>,
) -> Result<Created<Json<Article>>, ApiError> {
    let article = Article::create(pool, &form).map_err(map_store("Article"))?;
    let location = format!("/api/articles/{}", article.id);
    Ok(Created::new(location).body(Json(article)))
}

#[put("/articles/<id>", data = "<form>")]
pub fn update_article(
    _user: ApiUser,
    pool: &State<DbPool>,
    id: &str,
    form: Json<ArticleForm>,
) -> Result<Json<Article>, ApiError> {
    let id = parse_id(id, "article")?;
    Article::update(pool, id, &form)
        .map(Json)
        .map_err(map_store("Article"))
}

#[delete("/articles/<id>")]
pub fn delete_article(
    _user: ApiUser,
    pool: &State<DbPool>,
    id: &str,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(id, "article")?;
    Article::delete(pool, id).map_err(map_store("Article"))?;
    Ok(Json(json!({ "message": "Article deleted" })))
}
