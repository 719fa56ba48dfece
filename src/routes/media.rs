use log::error;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use super::parse_id;
use crate::auth::ApiUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::errors::{map_store, ApiError};
use crate::models::media::Media;
use crate::models::StoreError;

#[derive(FromForm)]
pub struct MediaUploadForm<'f> {
    pub file: TempFile<'f>,
}

#[get("/media")]
pub fn list_media(_user: ApiUser, pool: &State<DbPool>) -> Result<Json<Vec<Media>>, ApiError> {
    Media::list(pool).map(Json).map_err(map_store("Media"))
}

#[get("/media/<id>")]
pub fn get_media(_user: ApiUser, pool: &State<DbPool>, id: &str) -> Result<Json<Media>, ApiError> {
    let id = parse_id(id, "media")?;
    Media::find_by_id(pool, id)
        .map(Json)
        .map_err(map_store("Media"))
}

#[post("/media", data = "<form>")]
pub async fn upload_media(
    _user: ApiUser,
    pool: &State<DbPool>,
    config: &State<Config>,
    mut form: Form<MediaUploadForm<'_>>,
) -> Result<Created<Json<Media>>, ApiError> {
    let original_name = form
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();

    if form.file.len() == 0 && original_name.is_empty() {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    }

    let mime_type = form
        .file
        .content_type()
        .map(|ct| ct.to_string())
        .unwrap_or_default();
    let size = form.file.len() as i64;

    // Opaque storage name: uuid + an extension guessed from the upload
    let ext = form
        .file
        .content_type()
        .and_then(|ct| ct.extension())
        .map(|e| e.to_string().to_lowercase())
        .or_else(|| original_name.rsplit_once('.').map(|(_, e)| e.to_lowercase()))
        .unwrap_or_else(|| "bin".to_string());
    let filename = format!("{}.{}", uuid::Uuid::new_v4(), ext);

    let upload_dir = Path::new(&config.upload_dir);
    if let Err(e) = fs::create_dir_all(upload_dir) {
        error!("failed to create upload directory: {}", e);
        return Err(ApiError::Internal);
    }

    let dest = upload_dir.join(&filename);
    if let Err(e) = form.file.persist_to(&dest).await {
        error!("failed to persist upload {}: {}", filename, e);
        return Err(ApiError::Internal);
    }

    let media = store_media(
        pool,
        &config.upload_dir,
        &filename,
        &original_name,
        &mime_type,
        size,
    )
    .map_err(map_store("Media"))?;

    let location = format!("/api/media/{}", media.id);
    Ok(Created::new(location).body(Json(media)))
}

#[delete("/media/<id>")]
pub fn delete_media(
    _user: ApiUser,
    pool: &State<DbPool>,
    config: &State<Config>,
    id: &str,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(id, "media")?;
    remove_media(pool, &config.upload_dir, id).map_err(map_store("Media"))?;
    Ok(Json(json!({ "message": "Media deleted" })))
}

/// Insert the metadata row for an already-persisted upload. If the insert
/// fails, the file is removed again so no file is left without a row.
pub(crate) fn store_media(
    pool: &DbPool,
    upload_dir: &str,
    filename: &str,
    original_name: &str,
    mime_type: &str,
    size: i64,
) -> Result<Media, StoreError> {
    match Media::create(pool, filename, original_name, mime_type, size) {
        Ok(media) => Ok(media),
        Err(err) => {
            let _ = fs::remove_file(Path::new(upload_dir).join(filename));
            Err(err)
        }
    }
}

/// Delete the row, then the backing file. A file that is already gone does
/// not fail the deletion; storage-layer deletes are idempotent.
pub(crate) fn remove_media(pool: &DbPool, upload_dir: &str, id: i64) -> Result<(), StoreError> {
    let filename = Media::delete(pool, id)?;
    let _ = fs::remove_file(Path::new(upload_dir).join(filename));
    Ok(())
}
