use chrono::NaiveDate;
use birdlog::db::*;
use birdlog::error::BirdError;
use birdlog::model::*;
use birdlog::ops::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (rusqlite::Connection, Bird, Location) {
    let conn = schema::test_connection();
    let robin = bird_ops::add_bird(&conn, "Robin", Some("Erithacus rubecula"), None, None, None).unwrap();
    let garden = location_ops::add_location(&conn, "Garden", None).unwrap();
    (conn, robin, garden)
}

// ==========================================================================
// FAMILY OPS TESTS
// ==========================================================================

#[test]
fn add_family_trims_names() {
    let (conn, _, _) = setup();
    let family = family_ops::add_family(&conn, "  Turdidae ", Some("  ")).unwrap();
    assert_eq!(family.family_name, "Turdidae");
    assert!(family.subfamily_name.is_none());
}

#[test]
fn add_family_rejects_blank_name() {
    let (conn, _, _) = setup();
    let result = family_ops::add_family(&conn, "   ", None);
    assert!(matches!(result, Err(BirdError::BlankField { .. })));
}

#[test]
fn update_family_clears_subfamily() {
    let (conn, _, _) = setup();
    let family = family_ops::add_family(&conn, "Anatidae", Some("Anserinae")).unwrap();
    let updated = family_ops::update_family(&conn, family.id, None, Some(None)).unwrap();
    assert_eq!(updated.family_name, "Anatidae");
    assert!(updated.subfamily_name.is_none());
}

#[test]
fn delete_family_refused_while_birds_assigned() {
    let (conn, robin, _) = setup();
    let family = family_ops::add_family(&conn, "Muscicapidae", None).unwrap();
    bird_ops::update_bird(&conn, robin.id, None, None, None, None, Some(Some(family.id))).unwrap();

    let err = family_ops::delete_family(&conn, family.id).unwrap_err();
    assert!(matches!(err, BirdError::HasDependents { count: 1, .. }));

    bird_ops::update_bird(&conn, robin.id, None, None, None, None, Some(None)).unwrap();
    family_ops::delete_family(&conn, family.id).unwrap();
    assert!(family_repo::find_by_id(&conn, family.id).unwrap().is_none());
}

// ==========================================================================
// BIRD OPS TESTS
// ==========================================================================

#[test]
fn add_bird_with_all_fields() {
    let (conn, _, _) = setup();
    let family = family_ops::add_family(&conn, "Troglodytidae", None).unwrap();
    let wren = bird_ops::add_bird(
        &conn,
        " Wren ",
        Some("Troglodytes troglodytes"),
        Some("Troglodyte mignon"),
        Some("Resident"),
        Some(family.id),
    )
    .unwrap();

    assert_eq!(wren.english_name, "Wren");
    assert_eq!(wren.french_name.as_deref(), Some("Troglodyte mignon"));
    assert_eq!(wren.species_status.as_deref(), Some("Resident"));
    assert_eq!(wren.family_id, Some(family.id));
}

#[test]
fn add_bird_rejects_blank_name() {
    let (conn, _, _) = setup();
    assert!(bird_ops::add_bird(&conn, "  ", None, None, None, None).is_err());
}

#[test]
fn add_bird_rejects_unknown_family() {
    let (conn, _, _) = setup();
    let result = bird_ops::add_bird(&conn, "Wren", None, None, None, Some(Id::generate()));
    assert!(matches!(result, Err(BirdError::NotFound { .. })));
}

#[test]
fn update_bird_keeps_unspecified_fields() {
    let (conn, robin, _) = setup();
    let updated = bird_ops::update_bird(&conn, robin.id, Some("European Robin"), None, None, None, None).unwrap();
    assert_eq!(updated.english_name, "European Robin");
    assert_eq!(updated.latin_name.as_deref(), Some("Erithacus rubecula"));
}

#[test]
fn delete_bird_refused_with_sightings() {
    let (conn, robin, garden) = setup();
    sighting_ops::add_sighting(&conn, robin.id, garden.id, None, date(2024, 1, 1), false, 1, None).unwrap();

    let err = bird_ops::delete_bird(&conn, robin.id).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete \"Robin\" because it has 1 sighting(s). Please delete the sightings first."
    );
    assert!(bird_repo::find_by_id(&conn, robin.id).unwrap().is_some());
}

#[test]
fn delete_missing_bird_is_not_found() {
    let (conn, _, _) = setup();
    assert!(matches!(
        bird_ops::delete_bird(&conn, Id::generate()),
        Err(BirdError::NotFound { .. })
    ));
}

#[test]
fn bulk_delete_birds_is_all_or_nothing() {
    let (conn, robin, garden) = setup();
    let wren = bird_ops::add_bird(&conn, "Wren", None, None, None, None).unwrap();
    sighting_ops::add_sighting(&conn, robin.id, garden.id, None, date(2024, 1, 1), false, 1, None).unwrap();

    let err = bird_ops::bulk_delete_birds(&conn, &[robin.id, wren.id]).unwrap_err();
    assert!(matches!(err, BirdError::BulkDeleteBlocked(_)));
    assert!(err.to_string().contains("\"Robin\" (1 sightings)"));
    assert!(bird_repo::find_by_id(&conn, wren.id).unwrap().is_some());
}

#[test]
fn bulk_delete_birds_reports_names() {
    let (conn, robin, _) = setup();
    let wren = bird_ops::add_bird(&conn, "Wren", None, None, None, None).unwrap();

    let outcome = bird_ops::bulk_delete_birds(&conn, &[robin.id, wren.id, Id::generate()]).unwrap();
    assert_eq!(outcome.deleted, vec!["Robin", "Wren"]);
    assert_eq!(outcome.message("bird"), "Successfully deleted 2 bird(s): Robin, Wren.");
    assert!(bird_repo::find_all(&conn).unwrap().is_empty());
}

#[test]
fn bulk_delete_birds_rejects_empty_selection() {
    let (conn, _, _) = setup();
    assert!(matches!(
        bird_ops::bulk_delete_birds(&conn, &[]),
        Err(BirdError::EmptySet { .. })
    ));
}

// ==========================================================================
// LOCATION OPS TESTS
// ==========================================================================

#[test]
fn add_location_rejects_unknown_parent() {
    let (conn, _, _) = setup();
    let result = location_ops::add_location(&conn, "Pond", Some(Id::generate()));
    assert!(matches!(result, Err(BirdError::NotFound { .. })));
}

#[test]
fn update_location_rejects_self_as_parent() {
    let (conn, _, garden) = setup();
    let result = location_ops::update_location(&conn, garden.id, None, Some(Some(garden.id)));
    assert!(matches!(result, Err(BirdError::CircularParent)));
}

#[test]
fn update_location_rejects_descendant_as_parent() {
    let (conn, _, _) = setup();
    let uk = location_ops::add_location(&conn, "UK", None).unwrap();
    let norfolk = location_ops::add_location(&conn, "Norfolk", Some(uk.id)).unwrap();
    let cley = location_ops::add_location(&conn, "Cley", Some(norfolk.id)).unwrap();

    let result = location_ops::update_location(&conn, uk.id, None, Some(Some(cley.id)));
    assert!(matches!(result, Err(BirdError::CircularParent)));

    let unchanged = location_repo::find_by_id(&conn, uk.id).unwrap().unwrap();
    assert!(unchanged.parent_id.is_none());
}

#[test]
fn update_location_moves_to_top_level() {
    let (conn, _, garden) = setup();
    let uk = location_ops::add_location(&conn, "UK", None).unwrap();
    location_ops::update_location(&conn, garden.id, None, Some(Some(uk.id))).unwrap();

    let moved = location_ops::update_location(&conn, garden.id, Some("Back Garden"), Some(None)).unwrap();
    assert_eq!(moved.location_name, "Back Garden");
    assert!(moved.is_top_level());
}

#[test]
fn delete_location_refused_with_children() {
    let (conn, _, garden) = setup();
    location_ops::add_location(&conn, "Pond", Some(garden.id)).unwrap();

    let err = location_ops::delete_location(&conn, garden.id).unwrap_err();
    assert!(matches!(err, BirdError::HasDependents { .. }));
    assert!(err.to_string().contains("child location(s)"));
}

#[test]
fn delete_location_refused_with_sightings() {
    let (conn, robin, garden) = setup();
    sighting_ops::add_sighting(&conn, robin.id, garden.id, None, date(2024, 1, 1), false, 1, None).unwrap();

    let err = location_ops::delete_location(&conn, garden.id).unwrap_err();
    assert!(err.to_string().contains("1 sighting(s)"));
}

#[test]
fn bulk_delete_locations_lists_every_problem() {
    let (conn, robin, garden) = setup();
    let park = location_ops::add_location(&conn, "Park", None).unwrap();
    location_ops::add_location(&conn, "Lake", Some(park.id)).unwrap();
    let empty = location_ops::add_location(&conn, "Car Park", None).unwrap();
    sighting_ops::add_sighting(&conn, robin.id, garden.id, None, date(2024, 1, 1), false, 1, None).unwrap();

    let err = location_ops::bulk_delete_locations(&conn, &[garden.id, park.id, empty.id]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Cannot delete locations with sightings: \"Garden\" (1 sightings)"));
    assert!(message.contains("Cannot delete locations with child locations: \"Park\" (1 children)"));
    assert!(location_repo::find_by_id(&conn, empty.id).unwrap().is_some());
}

// ==========================================================================
// TRIP OPS TESTS
// ==========================================================================

#[test]
fn add_trip_rejects_reversed_dates() {
    let (conn, _, _) = setup();
    let result = trip_ops::add_trip(&conn, "Backwards", date(2024, 5, 2), date(2024, 5, 1), None);
    assert!(matches!(result, Err(BirdError::InvalidDateRange)));
}

#[test]
fn update_trip_revalidates_date_range() {
    let (conn, _, _) = setup();
    let trip = trip_ops::add_trip(&conn, "Spring", date(2024, 4, 1), date(2024, 4, 5), Some(" Migrants ")).unwrap();
    assert_eq!(trip.description, "Migrants");
    assert_eq!(trip.duration(), 5);

    let result = trip_ops::update_trip(&conn, trip.id, None, Some(date(2024, 4, 10)), None, None);
    assert!(matches!(result, Err(BirdError::InvalidDateRange)));

    let updated = trip_ops::update_trip(&conn, trip.id, None, Some(date(2024, 4, 3)), None, None).unwrap();
    assert_eq!(updated.duration(), 3);
}

#[test]
fn delete_trip_keeps_sightings() {
    let (conn, robin, garden) = setup();
    let trip = trip_ops::add_trip(&conn, "Spring", date(2024, 4, 1), date(2024, 4, 5), None).unwrap();
    let sighting = sighting_ops::add_sighting(
        &conn, robin.id, garden.id, Some(trip.id), date(2024, 4, 2), false, 1, None,
    )
    .unwrap();

    let (deleted, detached) = trip_ops::delete_trip(&conn, trip.id).unwrap();
    assert_eq!(deleted.trip_name, "Spring");
    assert_eq!(detached, 1);

    let kept = sighting_repo::find_by_id(&conn, sighting.sighting.id).unwrap().unwrap();
    assert!(kept.sighting.trip_id.is_none());
}

// ==========================================================================
// SIGHTING OPS TESTS
// ==========================================================================

#[test]
fn add_sighting_defaults() {
    let (conn, robin, garden) = setup();
    let detail = sighting_ops::add_sighting(
        &conn, robin.id, garden.id, None, date(2024, 2, 1), true, 3, Some("  singing  "),
    )
    .unwrap();

    assert_eq!(detail.bird_name, "Robin");
    assert_eq!(detail.location_name, "Garden");
    assert!(detail.sighting.heard_not_seen);
    assert_eq!(detail.sighting.count, 3);
    assert_eq!(detail.sighting.notes, "singing");
    assert!(detail.trip_name.is_none());
}

#[test]
fn add_sighting_rejects_zero_count() {
    let (conn, robin, garden) = setup();
    let result = sighting_ops::add_sighting(&conn, robin.id, garden.id, None, date(2024, 2, 1), false, 0, None);
    assert!(matches!(result, Err(BirdError::NonPositive { .. })));
}

#[test]
fn add_sighting_rejects_unknown_references() {
    let (conn, robin, garden) = setup();
    assert!(matches!(
        sighting_ops::add_sighting(&conn, Id::generate(), garden.id, None, date(2024, 2, 1), false, 1, None),
        Err(BirdError::NotFound { .. })
    ));
    assert!(matches!(
        sighting_ops::add_sighting(&conn, robin.id, Id::generate(), None, date(2024, 2, 1), false, 1, None),
        Err(BirdError::NotFound { .. })
    ));
    assert!(matches!(
        sighting_ops::add_sighting(&conn, robin.id, garden.id, Some(Id::generate()), date(2024, 2, 1), false, 1, None),
        Err(BirdError::NotFound { .. })
    ));
}

#[test]
fn update_sighting_changes_bird_and_clears_trip() {
    let (conn, robin, garden) = setup();
    let wren = bird_ops::add_bird(&conn, "Wren", None, None, None, None).unwrap();
    let trip = trip_ops::add_trip(&conn, "Walk", date(2024, 2, 1), date(2024, 2, 1), None).unwrap();
    let detail = sighting_ops::add_sighting(
        &conn, robin.id, garden.id, Some(trip.id), date(2024, 2, 1), false, 1, None,
    )
    .unwrap();
    assert_eq!(detail.trip_name.as_deref(), Some("Walk"));

    let updated = sighting_ops::update_sighting(
        &conn,
        detail.sighting.id,
        Some(wren.id),
        None,
        Some(None),
        None,
        None,
        Some(2),
        None,
    )
    .unwrap();

    assert_eq!(updated.bird_name, "Wren");
    assert_eq!(updated.sighting.count, 2);
    assert!(updated.sighting.trip_id.is_none());
    assert_eq!(updated.sighting.date_seen, date(2024, 2, 1));
}

#[test]
fn delete_sighting_returns_detail() {
    let (conn, robin, garden) = setup();
    let detail =
        sighting_ops::add_sighting(&conn, robin.id, garden.id, None, date(2024, 2, 1), false, 1, None).unwrap();

    let deleted = sighting_ops::delete_sighting(&conn, detail.sighting.id).unwrap();
    assert_eq!(deleted.bird_name, "Robin");
    assert!(sighting_repo::find_by_id(&conn, detail.sighting.id).unwrap().is_none());
    assert!(matches!(
        sighting_ops::delete_sighting(&conn, detail.sighting.id),
        Err(BirdError::NotFound { .. })
    ));
}
