use axum::extract::State;
use axum::Json;

use super::today;
use crate::queries::stats_queries::{self, Dashboard};
use crate::server::{ApiResult, AppState};

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    let today = today();
    let dashboard = state
        .run(move |conn| stats_queries::dashboard(conn, today))
        .await?;
    Ok(Json(dashboard))
}
