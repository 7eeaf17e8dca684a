use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{body, deleted};
use crate::model::Family;
use crate::ops::family_ops;
use crate::queries::family_queries::{self, FamilyRow};
use crate::server::{double_option, path_id, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct NewFamily {
    family_name: String,
    #[serde(default)]
    subfamily_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FamilyChanges {
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    subfamily_name: Option<Option<String>>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<FamilyRow>>> {
    let families = state.run(family_queries::list_with_counts).await?;
    Ok(Json(families))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewFamily>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Family>)> {
    let input = body(payload)?;

    let family = state
        .run(move |conn| {
            family_ops::add_family(conn, &input.family_name, input.subfamily_name.as_deref())
        })
        .await?;

    Ok((StatusCode::CREATED, Json(family)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<FamilyChanges>, JsonRejection>,
) -> ApiResult<Json<Family>> {
    let id = path_id(&raw_id, "Family")?;
    let changes = body(payload)?;

    let family = state
        .run(move |conn| {
            family_ops::update_family(
                conn,
                id,
                changes.family_name.as_deref(),
                changes.subfamily_name.as_ref().map(|v| v.as_deref()),
            )
        })
        .await?;

    Ok(Json(family))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw_id, "Family")?;
    let family = state.run(move |conn| family_ops::delete_family(conn, id)).await?;

    Ok(deleted(format!(
        "Family \"{}\" has been deleted successfully.",
        family.family_name
    )))
}
