//! JSON HTTP API.
//!
//! Handlers run their SQLite work on tokio's blocking pool against a single
//! mutex-guarded connection.

pub mod error;
mod handlers;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::error::BirdResult;
use crate::model::Id;
pub use error::{ApiError, ApiResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against the connection on the blocking thread pool.
    pub async fn run<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Connection) -> BirdResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
            f(&conn).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }
}

pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .route("/", get(handlers::home::dashboard))
        .route(
            "/sightings",
            get(handlers::sightings::list).post(handlers::sightings::create),
        )
        .route("/sightings/year/:year", get(handlers::sightings::year_redirect))
        .route(
            "/sightings/:id",
            get(handlers::sightings::show)
                .put(handlers::sightings::update)
                .delete(handlers::sightings::delete),
        )
        .route("/lifelist", get(handlers::lists::life_list))
        .route("/yearlist", get(handlers::lists::year_list))
        .route("/monthlist", get(handlers::lists::month_list))
        .route("/monthlist/:year", get(handlers::lists::month_list_year_redirect))
        .route(
            "/monthlist/:year/:month",
            get(handlers::lists::month_list_redirect),
        )
        .route("/api/search-birds", get(handlers::search::birds))
        .route("/api/search-locations", get(handlers::search::locations))
        .route(
            "/birds",
            get(handlers::birds::list).post(handlers::birds::create),
        )
        .route("/birds/bulk-delete", post(handlers::birds::bulk_delete))
        .route(
            "/birds/:id",
            get(handlers::birds::show)
                .put(handlers::birds::update)
                .delete(handlers::birds::delete),
        )
        .route(
            "/families",
            get(handlers::families::list).post(handlers::families::create),
        )
        .route(
            "/families/:id",
            put(handlers::families::update).delete(handlers::families::delete),
        )
        .route(
            "/locations",
            get(handlers::locations::list).post(handlers::locations::create),
        )
        .route("/locations/bulk-delete", post(handlers::locations::bulk_delete))
        .route(
            "/locations/:id",
            get(handlers::locations::show)
                .put(handlers::locations::update)
                .delete(handlers::locations::delete),
        )
        .route("/locations/:id/species", get(handlers::locations::species))
        .route("/locations/:id/sightings", get(handlers::locations::sightings))
        .route(
            "/trips",
            get(handlers::trips::list).post(handlers::trips::create),
        )
        .route(
            "/trips/:id",
            get(handlers::trips::show)
                .put(handlers::trips::update)
                .delete(handlers::trips::delete),
        )
        .fallback(fallback_handler)
        .layer(common_middleware)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &Config, conn: Connection) -> anyhow::Result<()> {
    let router = create_router(AppState::new(conn), config.request_timeout());
    let listener = TcpListener::bind(config.bind_address()).await?;

    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, starting graceful shutdown");
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": {
                "code": "not_found",
                "message": "The requested resource was not found"
            }
        })),
    )
}

/// Parses an id from a URL segment. Malformed ids can't match any record,
/// so they are reported as not found.
pub(crate) fn path_id<T>(raw: &str, entity_type: &str) -> ApiResult<Id<T>> {
    Id::parse(raw.trim())
        .map_err(|_| ApiError::NotFound(format!("{entity_type} not found: {raw}")))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
