use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::queries::bird_queries::{self, BirdSearchResult};
use crate::queries::location_queries::{self, LocationSearchResult};
use crate::server::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub struct BirdResults {
    birds: Vec<BirdSearchResult>,
}

#[derive(Debug, Serialize)]
pub struct LocationResults {
    locations: Vec<LocationSearchResult>,
}

pub async fn birds(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<BirdResults>> {
    let birds = state
        .run(move |conn| bird_queries::search(conn, &params.q))
        .await?;
    Ok(Json(BirdResults { birds }))
}

pub async fn locations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<LocationResults>> {
    let locations = state
        .run(move |conn| location_queries::search(conn, &params.q))
        .await?;
    Ok(Json(LocationResults { locations }))
}
