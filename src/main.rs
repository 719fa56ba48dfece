#[macro_use]
extern crate rocket;

use rocket::fs::FileServer;
use rocket::serde::json::Json;
use serde_json::{json, Value};

mod auth;
mod boot;
mod config;
mod cors;
mod db;
mod errors;
mod models;
mod routes;
#[cfg(test)]
mod tests;

use config::Config;

#[catch(400)]
fn bad_request() -> Json<Value> {
    Json(json!({ "error": "Bad request" }))
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "error": "Unauthorized" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "error": "Not found" }))
}

#[catch(422)]
fn unprocessable() -> Json<Value> {
    Json(json!({ "error": "Invalid request body" }))
}

#[catch(500)]
fn server_error() -> Json<Value> {
    Json(json!({ "error": "Internal server error" }))
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = Config::from_env();

    // Boot check — verify/create the upload and database directories
    boot::run(&config);

    let pool = db::init_pool(&config.db_path).expect("Failed to initialize database pool");
    db::run_migrations(&pool).expect("Failed to run database migrations");
    db::seed_admin(&pool, config.admin_password.as_deref()).expect("Failed to seed admin account");

    let upload_dir = config.upload_dir.clone();
    let cors = cors::Cors::new(config.allowed_origins.clone());

    rocket::build()
        .manage(pool)
        .manage(config)
        .attach(cors)
        .mount("/api", routes::api_routes())
        .mount("/uploads", FileServer::from(&upload_dir))
        .mount("/", FileServer::from(config::FRONTEND_DIR))
        .mount(
            "/",
            routes![cors::preflight, routes::frontend::spa_fallback],
        )
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                unprocessable,
                server_error
            ],
        )
}
