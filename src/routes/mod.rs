pub mod articles;
pub mod auth;
pub mod frontend;
pub mod media;
pub mod pages;

use rocket::Route;

use crate::errors::ApiError;

pub fn api_routes() -> Vec<Route> {
    routes![
        auth::login,
        auth::me,
        articles::list_articles,
        articles::get_article,
        articles::create_article,
        articles::update_article,
        articles::delete_article,
        pages::list_pages,
        pages::get_page,
        pages::create_page,
        pages::update_page,
        pages::delete_page,
        media::list_media,
        media::get_media,
        media::upload_media,
        media::delete_media,
    ]
}

/// Path identifiers arrive as raw strings so a non-numeric id is a 400,
/// not an unmatched route.
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", resource)))
}
