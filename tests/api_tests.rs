use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use birdlog::db::schema;
use birdlog::model::*;
use birdlog::ops::*;
use birdlog::server::{create_router, AppState};

struct Fixture {
    app: Router,
    robin: Bird,
    garden: Location,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> Fixture {
    let conn = schema::test_connection();
    let robin = bird_ops::add_bird(&conn, "Robin", Some("Erithacus rubecula"), None, None, None).unwrap();
    let garden = location_ops::add_location(&conn, "Garden", None).unwrap();

    Fixture {
        app: create_router(AppState::new(conn), Duration::from_secs(30)),
        robin,
        garden,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn record_sighting(f: &Fixture, bird_id: &str, seen: &str) -> Value {
    let (status, body) = send(
        &f.app,
        Method::POST,
        "/sightings",
        Some(json!({
            "bird_id": bird_id,
            "location_id": f.garden.id.to_string(),
            "date_seen": seen,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

// ==========================================================================
// ROUTING AND MIDDLEWARE
// ==========================================================================

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let f = setup();
    let (status, body) = get(&f.app, "/no/such/page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let f = setup();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = f.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn year_redirect_is_permanent() {
    let f = setup();
    let request = Request::builder().uri("/sightings/year/2024").body(Body::empty()).unwrap();
    let response = f.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/sightings?year=2024");
}

#[tokio::test]
async fn month_redirect_keeps_year_and_month() {
    let f = setup();
    let request = Request::builder().uri("/monthlist/2024/3").body(Body::empty()).unwrap();
    let response = f.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/monthlist?year=2024&month=3");
}

// ==========================================================================
// SIGHTINGS
// ==========================================================================

#[tokio::test]
async fn create_sighting_defaults_count_to_one() {
    let f = setup();
    let body = record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;
    assert_eq!(body["bird_name"], "Robin");
    assert_eq!(body["location_name"], "Garden");
    assert_eq!(body["count"], 1);
    assert_eq!(body["heard_not_seen"], false);

    let id = body["id"].as_str().unwrap();
    let (status, shown) = get(&f.app, &format!("/sightings/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["date_seen"], "2024-05-01");
}

#[tokio::test]
async fn create_sighting_rejects_zero_count() {
    let f = setup();
    let (status, body) = send(
        &f.app,
        Method::POST,
        "/sightings",
        Some(json!({
            "bird_id": f.robin.id.to_string(),
            "location_id": f.garden.id.to_string(),
            "date_seen": "2024-05-01",
            "count": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn create_sighting_rejects_malformed_body() {
    let f = setup();
    let (status, body) = send(
        &f.app,
        Method::POST,
        "/sightings",
        Some(json!({ "bird_id": f.robin.id.to_string(), "date_seen": "yesterday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn sighting_list_filters_by_year() {
    let f = setup();
    let robin = f.robin.id.to_string();
    record_sighting(&f, &robin, "2023-05-01").await;
    record_sighting(&f, &robin, "2024-05-01").await;

    let (status, body) = get(&f.app, "/sightings?year=2024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected_year"], 2024);
    assert_eq!(body["total"], 1);
    assert_eq!(body["available_years"], json!([2024, 2023]));

    let (_, far) = get(&f.app, "/sightings?year=300000").await;
    assert_eq!(far["selected_year"], 300000);
    assert_eq!(far["total"], 0);
}

#[tokio::test]
async fn malformed_sighting_id_is_not_found() {
    let f = setup();
    let (status, body) = get(&f.app, "/sightings/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn update_sighting_then_delete() {
    let f = setup();
    let created = record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &f.app,
        Method::PUT,
        &format!("/sightings/{id}"),
        Some(json!({ "count": 4, "heard_not_seen": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["count"], 4);
    assert_eq!(updated["heard_not_seen"], true);

    let (status, body) = send(&f.app, Method::DELETE, &format!("/sightings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = get(&f.app, &format!("/sightings/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ==========================================================================
// LISTS
// ==========================================================================

#[tokio::test]
async fn life_list_pages_and_counts() {
    let f = setup();
    record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;

    let (status, body) = get(&f.app, "/lifelist?page_size=10&page=99").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_species"], 1);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["page_size"], "10");
    assert_eq!(body["items"][0]["bird"]["english_name"], "Robin");
    assert_eq!(body["items"][0]["is_lifelist_addition"], true);
}

#[tokio::test]
async fn year_list_includes_stats_for_selected_year() {
    let f = setup();
    let robin = f.robin.id.to_string();
    record_sighting(&f, &robin, "2023-05-01").await;
    record_sighting(&f, &robin, "2024-05-01").await;

    let (status, body) = get(&f.app, "/yearlist?year=2024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "2024");
    assert_eq!(body["stats"]["unique_species"], 1);
    assert_eq!(body["stats"]["new_species"], 0);
    assert_eq!(body["years"][0]["year"], 2024);

    let (_, all) = get(&f.app, "/yearlist").await;
    assert_eq!(all["period"]["kind"], "all_time");
    assert!(all["stats"].is_null());
}

#[tokio::test]
async fn month_list_with_invalid_month_falls_back_to_all_time() {
    let f = setup();
    record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;

    let (status, body) = get(&f.app, "/monthlist?year=2024&month=13").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "All time");
    assert_eq!(body["total_species"], 1);

    let (_, may) = get(&f.app, "/monthlist?year=2024&month=5").await;
    assert_eq!(may["title"], "May 2024");
    assert_eq!(may["months"][0]["months"][0]["month_name"], "May");
}

#[tokio::test]
async fn month_list_stats_only_for_a_selected_month() {
    let f = setup();
    record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;

    let (_, year_only) = get(&f.app, "/monthlist?year=2024").await;
    assert_eq!(year_only["title"], "2024");
    assert!(year_only["stats"].is_null());

    let (_, may) = get(&f.app, "/monthlist?year=2024&month=5").await;
    assert_eq!(may["stats"]["unique_species"], 1);
}

#[tokio::test]
async fn period_lists_serve_first_page_when_page_is_out_of_range() {
    let f = setup();
    let (_, wren) = send(&f.app, Method::POST, "/birds", Some(json!({ "english_name": "Wren" }))).await;
    record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;
    record_sighting(&f, wren["id"].as_str().unwrap(), "2024-04-01").await;

    let (status, body) = get(&f.app, "/yearlist?year=2024&page_size=1&page=99").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["items"][0]["bird"]["english_name"], "Robin");

    let (_, month) = get(&f.app, "/monthlist?year=2024&month=4&page_size=1&page=0").await;
    assert_eq!(month["pagination"]["page"], 1);
    assert_eq!(month["items"][0]["bird"]["english_name"], "Wren");

    let (_, second) = get(&f.app, "/yearlist?year=2024&page_size=1&page=2").await;
    assert_eq!(second["items"][0]["bird"]["english_name"], "Wren");
}

// ==========================================================================
// SEARCH
// ==========================================================================

#[tokio::test]
async fn search_birds_needs_two_characters() {
    let f = setup();
    let (_, short) = get(&f.app, "/api/search-birds?q=r").await;
    assert_eq!(short["birds"], json!([]));

    let (status, body) = get(&f.app, "/api/search-birds?q=rob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["birds"][0]["display_name"], "Robin (Erithacus rubecula)");
}

#[tokio::test]
async fn search_locations_returns_full_path() {
    let f = setup();
    let (status, created) = send(
        &f.app,
        Method::POST,
        "/locations",
        Some(json!({ "location_name": "Pond", "parent_id": f.garden.id.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["location_name"], "Pond");

    let (_, body) = get(&f.app, "/api/search-locations?q=pon").await;
    assert_eq!(body["locations"][0]["full_path"], "Garden > Pond");
}

// ==========================================================================
// BIRDS, LOCATIONS AND TRIPS
// ==========================================================================

#[tokio::test]
async fn create_bird_rejects_blank_name() {
    let f = setup();
    let (status, body) = send(&f.app, Method::POST, "/birds", Some(json!({ "english_name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "english_name cannot be blank");
}

#[tokio::test]
async fn update_bird_null_clears_latin_name() {
    let f = setup();
    let (status, body) = send(
        &f.app,
        Method::PUT,
        &format!("/birds/{}", f.robin.id),
        Some(json!({ "latin_name": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["english_name"], "Robin");
    assert!(body["latin_name"].is_null());
}

#[tokio::test]
async fn delete_bird_with_sightings_conflicts() {
    let f = setup();
    record_sighting(&f, &f.robin.id.to_string(), "2024-05-01").await;

    let (status, body) = send(&f.app, Method::DELETE, &format!("/birds/{}", f.robin.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(
        body["error"]["message"],
        "Cannot delete \"Robin\" because it has 1 sighting(s). Please delete the sightings first."
    );
}

#[tokio::test]
async fn bulk_delete_birds_reports_message() {
    let f = setup();
    let (_, wren) = send(&f.app, Method::POST, "/birds", Some(json!({ "english_name": "Wren" }))).await;

    let (status, body) = send(
        &f.app,
        Method::POST,
        "/birds/bulk-delete",
        Some(json!({ "ids": [f.robin.id.to_string(), wren["id"]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully deleted 2 bird(s): Robin, Wren.");

    let (_, list) = get(&f.app, "/birds").await;
    assert_eq!(list["pagination"]["total_items"], 0);
}

#[tokio::test]
async fn location_cannot_become_its_own_parent() {
    let f = setup();
    let (status, body) = send(
        &f.app,
        Method::PUT,
        &format!("/locations/{}", f.garden.id),
        Some(json!({ "parent_id": f.garden.id.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn location_species_and_sightings_pages() {
    let f = setup();
    let robin = f.robin.id.to_string();
    record_sighting(&f, &robin, "2024-05-01").await;
    record_sighting(&f, &robin, "2024-06-01").await;

    let (status, species) = get(&f.app, &format!("/locations/{}/species", f.garden.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(species["items"][0]["total_sightings"], 2);

    let (status, sightings) = get(&f.app, &format!("/locations/{}/sightings", f.garden.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sightings["pagination"]["total_items"], 2);
    assert_eq!(sightings["items"][0]["date_seen"], "2024-06-01");

    let (status, _) = get(&f.app, &format!("/locations/{}/species", Id::<Location>::generate())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trip_rejects_reversed_dates_and_dereferences_on_delete() {
    let f = setup();
    let (status, _) = send(
        &f.app,
        Method::POST,
        "/trips",
        Some(json!({ "trip_name": "Backwards", "start_date": "2024-05-05", "end_date": "2024-05-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, trip) = send(
        &f.app,
        Method::POST,
        "/trips",
        Some(json!({ "trip_name": "Weekend", "start_date": "2024-05-04", "end_date": "2024-05-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let trip_id = trip["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &f.app,
        Method::POST,
        "/sightings",
        Some(json!({
            "bird_id": f.robin.id.to_string(),
            "location_id": f.garden.id.to_string(),
            "trip_id": trip_id,
            "date_seen": date(2024, 5, 4),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&f.app, Method::DELETE, &format!("/trips/{trip_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Trip \"Weekend\" deleted successfully. 1 sighting(s) have been dereferenced."
    );
}

#[tokio::test]
async fn dashboard_reports_life_list_count() {
    let f = setup();
    record_sighting(&f, &f.robin.id.to_string(), "2020-01-01").await;

    let (status, body) = get(&f.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["life_list_count"], 1);
}
