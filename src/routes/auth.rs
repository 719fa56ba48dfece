use log::error;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::auth::{self, ApiUser};
use crate::config::Config;
use crate::db::DbPool;
use crate::errors::{map_store, ApiError};
use crate::models::user::User;
use crate::models::StoreError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[post("/auth/login", data = "<body>")]
pub fn login(
    pool: &State<DbPool>,
    config: &State<Config>,
    body: Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Unknown user and wrong password map to the same outward signal
    let user = match User::get_by_username(pool, &body.username) {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()))
        }
        Err(e) => return Err(map_store("User")(e)),
    };

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = auth::issue_token(&config.token_secret, &user.username, config.token_expiry_hours)
        .map_err(|e| {
            error!("token issuance failed: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(LoginResponse { token, user }))
}

#[get("/auth/me")]
pub fn me(user: ApiUser, pool: &State<DbPool>) -> Result<Json<User>, ApiError> {
    match User::get_by_username(pool, &user.username) {
        Ok(u) => Ok(Json(u)),
        // Valid signature but the subject no longer exists (stale token)
        Err(StoreError::NotFound) => {
            Err(ApiError::Unauthorized("Invalid token subject".to_string()))
        }
        Err(e) => Err(map_store("User")(e)),
    }
}
