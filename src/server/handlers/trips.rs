use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{body, deleted, int_param};
use crate::model::Trip;
use crate::ops::trip_ops;
use crate::queries::trip_queries::{self, TripDetail, TripFilter, TripRow};
use crate::server::{path_id, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct TripListParams {
    search: Option<String>,
    year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TripList {
    available_years: Vec<i32>,
    selected_year: Option<i32>,
    total: usize,
    trips: Vec<TripRow>,
}

#[derive(Debug, Deserialize)]
pub struct NewTrip {
    trip_name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TripChanges {
    #[serde(default)]
    trip_name: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    description: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TripListParams>,
) -> ApiResult<Json<TripList>> {
    let selected_year = int_param::<i32>(params.year.as_deref());
    let filter = TripFilter {
        search: params.search,
        year: selected_year,
    };

    let (available_years, trips) = state
        .run(move |conn| {
            Ok((
                trip_queries::available_years(conn)?,
                trip_queries::list(conn, &filter)?,
            ))
        })
        .await?;

    Ok(Json(TripList {
        available_years,
        selected_year,
        total: trips.len(),
        trips,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewTrip>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Trip>)> {
    let input = body(payload)?;

    let trip = state
        .run(move |conn| {
            trip_ops::add_trip(
                conn,
                &input.trip_name,
                input.start_date,
                input.end_date,
                input.description.as_deref(),
            )
        })
        .await?;

    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<TripDetail>> {
    let id = path_id(&raw_id, "Trip")?;
    let detail = state.run(move |conn| trip_queries::detail(conn, id)).await?;
    Ok(Json(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<TripChanges>, JsonRejection>,
) -> ApiResult<Json<Trip>> {
    let id = path_id(&raw_id, "Trip")?;
    let changes = body(payload)?;

    let trip = state
        .run(move |conn| {
            trip_ops::update_trip(
                conn,
                id,
                changes.trip_name.as_deref(),
                changes.start_date,
                changes.end_date,
                changes.description.as_deref(),
            )
        })
        .await?;

    Ok(Json(trip))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw_id, "Trip")?;
    let (trip, detached) = state.run(move |conn| trip_ops::delete_trip(conn, id)).await?;

    let message = if detached > 0 {
        format!(
            "Trip \"{}\" deleted successfully. {} sighting(s) have been dereferenced.",
            trip.trip_name, detached
        )
    } else {
        format!("Trip \"{}\" deleted successfully.", trip.trip_name)
    };

    Ok(deleted(message))
}
