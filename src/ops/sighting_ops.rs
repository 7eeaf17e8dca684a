use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::db::{bird_repo, location_repo, sighting_repo, trip_repo};
use crate::error::{BirdError, BirdResult};
use crate::model::{Bird, Id, Location, Sighting, SightingDetail, Trip};
use crate::validation;

fn ensure_references(
    conn: &Connection,
    bird_id: Id<Bird>,
    location_id: Id<Location>,
    trip_id: Option<Id<Trip>>,
) -> BirdResult<()> {
    bird_repo::find_by_id(conn, bird_id)?.ok_or_else(|| BirdError::not_found("Bird", bird_id))?;
    location_repo::find_by_id(conn, location_id)?
        .ok_or_else(|| BirdError::not_found("Location", location_id))?;
    if let Some(tid) = trip_id {
        trip_repo::find_by_id(conn, tid)?.ok_or_else(|| BirdError::not_found("Trip", tid))?;
    }
    Ok(())
}

fn reload(conn: &Connection, sighting_id: Id<Sighting>) -> BirdResult<SightingDetail> {
    sighting_repo::find_by_id(conn, sighting_id)?
        .ok_or_else(|| BirdError::not_found("Sighting", sighting_id))
}

pub fn add_sighting(
    conn: &Connection,
    bird_id: Id<Bird>,
    location_id: Id<Location>,
    trip_id: Option<Id<Trip>>,
    date_seen: NaiveDate,
    heard_not_seen: bool,
    count: i32,
    notes: Option<&str>,
) -> BirdResult<SightingDetail> {
    let count = validation::positive(count, "count")?;
    ensure_references(conn, bird_id, location_id, trip_id)?;

    let mut sighting = Sighting::create(bird_id, location_id, date_seen);
    sighting.trip_id = trip_id;
    sighting.heard_not_seen = heard_not_seen;
    sighting.count = count;
    sighting.notes = notes.map(|n| n.trim().to_string()).unwrap_or_default();

    sighting_repo::insert(conn, &sighting)?;
    let detail = reload(conn, sighting.id)?;
    info!(bird = %detail.bird_name, location = %detail.location_name, date = %date_seen, "sighting recorded");
    Ok(detail)
}

pub fn update_sighting(
    conn: &Connection,
    sighting_id: Id<Sighting>,
    bird_id: Option<Id<Bird>>,
    location_id: Option<Id<Location>>,
    trip_id: Option<Option<Id<Trip>>>,
    date_seen: Option<NaiveDate>,
    heard_not_seen: Option<bool>,
    count: Option<i32>,
    notes: Option<&str>,
) -> BirdResult<SightingDetail> {
    let mut sighting = reload(conn, sighting_id)?.sighting;

    if let Some(b) = bird_id {
        sighting.bird_id = b;
    }
    if let Some(l) = location_id {
        sighting.location_id = l;
    }
    if let Some(t) = trip_id {
        sighting.trip_id = t;
    }
    if let Some(d) = date_seen {
        sighting.date_seen = d;
    }
    if let Some(h) = heard_not_seen {
        sighting.heard_not_seen = h;
    }
    if let Some(c) = count {
        sighting.count = validation::positive(c, "count")?;
    }
    if let Some(n) = notes {
        sighting.notes = n.trim().to_string();
    }
    ensure_references(conn, sighting.bird_id, sighting.location_id, sighting.trip_id)?;

    sighting_repo::update(conn, &sighting)?;
    let detail = reload(conn, sighting_id)?;
    info!(bird = %detail.bird_name, date = %detail.sighting.date_seen, "sighting updated");
    Ok(detail)
}

pub fn delete_sighting(conn: &Connection, sighting_id: Id<Sighting>) -> BirdResult<SightingDetail> {
    let detail = reload(conn, sighting_id)?;
    sighting_repo::delete(conn, sighting_id)?;
    info!(bird = %detail.bird_name, date = %detail.sighting.date_seen, "sighting deleted");
    Ok(detail)
}
