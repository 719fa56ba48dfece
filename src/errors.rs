use log::error;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::json;

use crate::models::StoreError;

/// Client-facing error classes. Each renders as `{"error": "..."}` JSON with
/// the matching status. Internal detail never reaches the response body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::Internal => Status::InternalServerError,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => m,
            ApiError::Internal => "Internal server error",
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let mut res = Json(json!({ "error": self.message() })).respond_to(request)?;
        res.set_status(status);
        Ok(res)
    }
}

/// Map a storage error onto the API taxonomy for one resource.
/// Internal failures are logged here with detail and surfaced opaquely.
pub(crate) fn map_store(resource: &'static str) -> impl Fn(StoreError) -> ApiError {
    move |err| match err {
        StoreError::NotFound => ApiError::NotFound(format!("{} not found", resource)),
        StoreError::Conflict(_) => ApiError::Conflict(format!("{} already exists", resource)),
        StoreError::Internal(detail) => {
            error!("{} store failure: {}", resource, detail);
            ApiError::Internal
        }
    }
}
