use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::Config;

type HmacSha256 = Hmac<Sha256>;

// ── Password utilities ──

pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| e.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Bearer tokens ──

/// Self-contained token claims. The token carries everything the guard
/// needs, so verification never touches the database.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed token for `username`, expiring `expiry_hours` from now.
/// Format: `base64url(claims_json).hmac_hex`
pub fn issue_token(secret: &str, username: &str, expiry_hours: i64) -> Result<String, String> {
    let now = Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
    };

    let payload = serde_json::to_vec(&claims).map_err(|e| e.to_string())?;
    let encoded = URL_SAFE_NO_PAD.encode(payload);
    let sig = hmac_signature(secret, &encoded);
    Ok(format!("{}.{}", encoded, sig))
}

/// Verify a token's signature and expiry and return its claims.
/// Returns `None` if the token is malformed, tampered with, or expired.
pub fn verify_token(secret: &str, token: &str) -> Option<Claims> {
    let dot = token.rfind('.')?;
    let encoded = &token[..dot];
    let sig = &token[dot + 1..];

    let expected = hmac_signature(secret, encoded);
    if sig.len() != expected.len() || !constant_time_eq(sig.as_bytes(), expected.as_bytes()) {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    let claims: Claims = serde_json::from_slice(&payload).ok()?;

    if claims.exp <= Utc::now().timestamp() {
        return None;
    }

    Some(claims)
}

fn hmac_signature(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison to prevent timing attacks on token signatures.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ── Bearer token request guard ──

/// Guard: any request carrying a valid `Authorization: Bearer` token.
/// Verification is purely cryptographic: no session table, no DB access.
pub struct ApiUser {
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match request.guard::<&State<Config>>().await {
            Outcome::Success(c) => c,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let header = match request.headers().get_one("Authorization") {
            Some(h) => h,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let token = match header.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => return Outcome::Error((Status::Unauthorized, ())),
        };

        match verify_token(&config.token_secret, token) {
            Some(claims) => Outcome::Success(ApiUser {
                username: claims.sub,
            }),
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
