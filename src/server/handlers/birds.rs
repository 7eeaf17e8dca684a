use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{body, deleted, BulkDeleted};
use crate::model::{Bird, Family, Id};
use crate::ops::bird_ops;
use crate::pagination::{self, Page, PageSize, BIRDS_PER_PAGE};
use crate::queries::bird_queries::{self, BirdDetail, BirdFilter, BirdRow};
use crate::server::{double_option, path_id, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct BirdListParams {
    search: Option<String>,
    family: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewBird {
    english_name: String,
    #[serde(default)]
    latin_name: Option<String>,
    #[serde(default)]
    french_name: Option<String>,
    #[serde(default)]
    species_status: Option<String>,
    #[serde(default)]
    family_id: Option<Id<Family>>,
}

#[derive(Debug, Deserialize)]
pub struct BirdChanges {
    #[serde(default)]
    english_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    latin_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    french_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    species_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    family_id: Option<Option<Id<Family>>>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBirds {
    #[serde(default)]
    ids: Vec<Id<Bird>>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<BirdListParams>,
) -> ApiResult<Json<Page<BirdRow>>> {
    let family = params.family.as_deref().map(str::trim).filter(|f| !f.is_empty());
    let page = params.page.clone();

    let rows = match family.map(Id::<Family>::parse) {
        // A malformed family id can't match any bird.
        Some(Err(_)) => Vec::new(),
        family_id => {
            let filter = BirdFilter {
                search: params.search,
                family_id: family_id.and_then(Result::ok),
            };
            state.run(move |conn| bird_queries::list(conn, &filter)).await?
        }
    };

    Ok(Json(pagination::paginate(
        rows,
        page.as_deref(),
        PageSize::Count(BIRDS_PER_PAGE),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewBird>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Bird>)> {
    let input = body(payload)?;

    let bird = state
        .run(move |conn| {
            bird_ops::add_bird(
                conn,
                &input.english_name,
                input.latin_name.as_deref(),
                input.french_name.as_deref(),
                input.species_status.as_deref(),
                input.family_id,
            )
        })
        .await?;

    Ok((StatusCode::CREATED, Json(bird)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<BirdDetail>> {
    let id = path_id(&raw_id, "Bird")?;
    let detail = state.run(move |conn| bird_queries::detail(conn, id)).await?;
    Ok(Json(detail))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<BirdChanges>, JsonRejection>,
) -> ApiResult<Json<Bird>> {
    let id = path_id(&raw_id, "Bird")?;
    let changes = body(payload)?;

    let bird = state
        .run(move |conn| {
            bird_ops::update_bird(
                conn,
                id,
                changes.english_name.as_deref(),
                changes.latin_name.as_ref().map(|v| v.as_deref()),
                changes.french_name.as_ref().map(|v| v.as_deref()),
                changes.species_status.as_ref().map(|v| v.as_deref()),
                changes.family_id,
            )
        })
        .await?;

    Ok(Json(bird))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = path_id(&raw_id, "Bird")?;
    let bird = state.run(move |conn| bird_ops::delete_bird(conn, id)).await?;

    Ok(deleted(format!(
        "Bird \"{}\" has been deleted successfully.",
        bird.english_name
    )))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    payload: Result<Json<BulkDeleteBirds>, JsonRejection>,
) -> ApiResult<Json<BulkDeleted>> {
    let input = body(payload)?;

    let outcome = state
        .run(move |conn| bird_ops::bulk_delete_birds(conn, &input.ids))
        .await?;

    Ok(BulkDeleted::new(outcome.message("bird"), outcome.deleted))
}
