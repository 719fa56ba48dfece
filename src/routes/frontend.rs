use rocket::fs::NamedFile;
use std::path::Path;

use crate::config::FRONTEND_DIR;

/// SPA fallback: any GET the API and static mounts did not match gets the
/// frontend index so client-side routing can take over.
#[get("/<_..>", rank = 20)]
pub async fn spa_fallback() -> Option<NamedFile> {
    NamedFile::open(Path::new(FRONTEND_DIR).join("index.html"))
        .await
        .ok()
}
