use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{body, deleted, int_param};
use crate::model::{Bird, Id, Location, SightingDetail, Trip};
use crate::ops::sighting_ops;
use crate::queries::sighting_queries;
use crate::server::{double_option, path_id, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SightingListParams {
    year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SightingList {
    selected_year: Option<i32>,
    available_years: Vec<i32>,
    total: usize,
    sightings: Vec<SightingDetail>,
}

#[derive(Debug, Deserialize)]
pub struct NewSighting {
    bird_id: Id<Bird>,
    location_id: Id<Location>,
    #[serde(default)]
    trip_id: Option<Id<Trip>>,
    date_seen: NaiveDate,
    #[serde(default)]
    heard_not_seen: bool,
    #[serde(default = "default_count")]
    count: i32,
    #[serde(default)]
    notes: Option<String>,
}

fn default_count() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SightingChanges {
    #[serde(default)]
    bird_id: Option<Id<Bird>>,
    #[serde(default)]
    location_id: Option<Id<Location>>,
    #[serde(default, deserialize_with = "double_option")]
    trip_id: Option<Option<Id<Trip>>>,
    #[serde(default)]
    date_seen: Option<NaiveDate>,
    #[serde(default)]
    heard_not_seen: Option<bool>,
    #[serde(default)]
    count: Option<i32>,
    #[serde(default)]
    notes: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SightingListParams>,
) -> ApiResult<Json<SightingList>> {
    let selected_year = int_param::<i32>(params.year.as_deref());

    let (available_years, sightings) = state
        .run(move |conn| {
            Ok((
                sighting_queries::available_years(conn)?,
                sighting_queries::list(conn, selected_year)?,
            ))
        })
        .await?;

    Ok(Json(SightingList {
        selected_year,
        available_years,
        total: sightings.len(),
        sightings,
    }))
}

pub async fn year_redirect(Path(year): Path<String>) -> Redirect {
    match int_param::<i32>(Some(&year)) {
        Some(y) => Redirect::permanent(&format!("/sightings?year={y}")),
        None => Redirect::permanent("/sightings"),
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewSighting>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SightingDetail>)> {
    let input = body(payload)?;

    let detail = state
        .run(move |conn| {
            sighting_ops::add_sighting(
                conn,
                input.bird_id,
                input.location_id,
                input.trip_id,
                input.date_seen,
                input.heard_not_seen,
                input.count,
                input.notes.as_deref(),
            )
        })
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<SightingDetail>> {
    let id = path_id(&raw_id, "Sighting")?;
    let detail = state
        .run(move |conn| sighting_queries::get_sighting(conn, id))
        .await?;
    Ok(Json(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<SightingChanges>, JsonRejection>,
) -> ApiResult<Json<SightingDetail>> {
    let id = path_id(&raw_id, "Sighting")?;
    let changes = body(payload)?;

    let detail = state
        .run(move |conn| {
            sighting_ops::update_sighting(
                conn,
                id,
                changes.bird_id,
                changes.location_id,
                changes.trip_id,
                changes.date_seen,
                changes.heard_not_seen,
                changes.count,
                changes.notes.as_deref(),
            )
        })
        .await?;

    Ok(Json(detail))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw_id, "Sighting")?;
    let removed = state
        .run(move |conn| sighting_ops::delete_sighting(conn, id))
        .await?;

    Ok(deleted(format!(
        "Sighting of {} on {} has been deleted successfully.",
        removed.bird_name, removed.sighting.date_seen
    )))
}
