use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{body, deleted, flag_param, BulkDeleted};
use crate::model::{Id, Location, SightingDetail};
use crate::ops::location_ops;
use crate::pagination::{
    self, Page, PageSize, LOCATIONS_PER_PAGE, LOCATION_SIGHTINGS_PER_PAGE, LOCATION_SPECIES_PER_PAGE,
};
use crate::queries::list_queries::{self, LocationSpecies};
use crate::queries::location_queries::{self, LocationDetail, LocationFilter, LocationRow};
use crate::server::{double_option, path_id, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LocationListParams {
    search: Option<String>,
    parent: Option<String>,
    top_level: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewLocation {
    location_name: String,
    #[serde(default)]
    parent_id: Option<Id<Location>>,
}

#[derive(Debug, Deserialize)]
pub struct LocationChanges {
    #[serde(default)]
    location_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    parent_id: Option<Option<Id<Location>>>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteLocations {
    #[serde(default)]
    ids: Vec<Id<Location>>,
}

#[derive(Debug, Serialize)]
pub struct LocationSpeciesPage {
    location: Location,
    full_path: String,
    total_species: usize,
    #[serde(flatten)]
    page: Page<LocationSpecies>,
}

#[derive(Debug, Serialize)]
pub struct LocationSightingsPage {
    location: Location,
    full_path: String,
    #[serde(flatten)]
    page: Page<SightingDetail>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<LocationListParams>,
) -> ApiResult<Json<Page<LocationRow>>> {
    let parent = params.parent.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let page = params.page.clone();

    let rows = match parent.map(Id::<Location>::parse) {
        // A malformed parent id can't match any location.
        Some(Err(_)) => Vec::new(),
        parent_id => {
            let filter = LocationFilter {
                search: params.search,
                parent_id: parent_id.and_then(Result::ok),
                top_level_only: flag_param(params.top_level.as_deref()),
            };
            state.run(move |conn| location_queries::list(conn, &filter)).await?
        }
    };

    Ok(Json(pagination::paginate(
        rows,
        page.as_deref(),
        PageSize::Count(LOCATIONS_PER_PAGE),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewLocation>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    let input = body(payload)?;

    let location = state
        .run(move |conn| location_ops::add_location(conn, &input.location_name, input.parent_id))
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<LocationDetail>> {
    let id = path_id(&raw_id, "Location")?;
    let detail = state.run(move |conn| location_queries::detail(conn, id)).await?;
    Ok(Json(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<LocationChanges>, JsonRejection>,
) -> ApiResult<Json<Location>> {
    let id = path_id(&raw_id, "Location")?;
    let changes = body(payload)?;

    let location = state
        .run(move |conn| {
            location_ops::update_location(
                conn,
                id,
                changes.location_name.as_deref(),
                changes.parent_id,
            )
        })
        .await?;

    Ok(Json(location))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw_id, "Location")?;
    let location = state
        .run(move |conn| location_ops::delete_location(conn, id))
        .await?;

    Ok(deleted(format!(
        "Location \"{}\" has been deleted successfully.",
        location.location_name
    )))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    payload: Result<Json<BulkDeleteLocations>, JsonRejection>,
) -> ApiResult<Json<BulkDeleted>> {
    let input = body(payload)?;

    let outcome = state
        .run(move |conn| location_ops::bulk_delete_locations(conn, &input.ids))
        .await?;

    Ok(BulkDeleted::new(outcome.message("location"), outcome.deleted))
}

pub async fn species(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<LocationSpeciesPage>> {
    let id = path_id(&raw_id, "Location")?;

    let (location, full_path, species) = state
        .run(move |conn| {
            let location = location_queries::get_location(conn, id)?;
            let full_path = location_queries::full_path_string(conn, &location)?;
            let species = list_queries::location_species(conn, id)?;
            Ok((location, full_path, species))
        })
        .await?;

    Ok(Json(LocationSpeciesPage {
        location,
        full_path,
        total_species: species.len(),
        page: pagination::paginate(
            species,
            params.page.as_deref(),
            PageSize::Count(LOCATION_SPECIES_PER_PAGE),
        ),
    }))
}

pub async fn sightings(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<LocationSightingsPage>> {
    let id = path_id(&raw_id, "Location")?;

    let (location, full_path, sightings) = state
        .run(move |conn| {
            let location = location_queries::get_location(conn, id)?;
            let full_path = location_queries::full_path_string(conn, &location)?;
            let sightings = location_queries::sightings(conn, id)?;
            Ok((location, full_path, sightings))
        })
        .await?;

    Ok(Json(LocationSightingsPage {
        location,
        full_path,
        page: pagination::paginate(
            sightings,
            params.page.as_deref(),
            PageSize::Count(LOCATION_SIGHTINGS_PER_PAGE),
        ),
    }))
}
