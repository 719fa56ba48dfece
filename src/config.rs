use log::warn;
use rand::RngCore;
use std::env;

/// Directory the built single-page frontend is served from.
pub const FRONTEND_DIR: &str = "frontend/dist";

/// Runtime configuration, read once from the environment at startup and
/// shared via Rocket managed state.
pub struct Config {
    pub db_path: String,
    pub upload_dir: String,
    pub admin_password: Option<String>,
    pub token_secret: String,
    pub token_expiry_hours: i64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "./cms.db".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());

        let token_secret = env::var("TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_secret);

        let token_expiry_hours = env::var("TOKEN_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| v.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                ]
            });

        Config {
            db_path,
            upload_dir,
            admin_password,
            token_secret,
            token_expiry_hours,
            allowed_origins,
        }
    }
}

/// Fall back to a random per-process secret. Issued tokens stop verifying
/// after a restart, so every login is invalidated.
fn generate_secret() -> String {
    warn!("TOKEN_SECRET not set; generated a random per-process secret (tokens will not survive a restart)");
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
