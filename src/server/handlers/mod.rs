pub mod home;
pub mod sightings;
pub mod lists;
pub mod search;
pub mod birds;
pub mod families;
pub mod locations;
pub mod trips;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};

use super::{ApiError, ApiResult};

/// Unwraps a JSON body, reporting malformed input in the API error format.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub(crate) fn deleted(message: String) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

#[derive(Debug, Serialize)]
pub struct BulkDeleted {
    success: bool,
    message: String,
    deleted: Vec<String>,
}

impl BulkDeleted {
    pub(crate) fn new(message: String, deleted: Vec<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message,
            deleted,
        })
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Lenient integer query parameter: anything unparsable is treated as absent.
pub(crate) fn int_param<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim).and_then(|s| s.parse().ok())
}

/// Lenient boolean query parameter, as sent by checkboxes and links.
pub(crate) fn flag_param(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "on" | "yes")
    )
}
