use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

use crate::db::trip_repo;
use crate::error::{BirdError, BirdResult};
use crate::model::{Id, Trip};
use crate::validation;

pub fn add_trip(
    conn: &Connection,
    trip_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    description: Option<&str>,
) -> BirdResult<Trip> {
    let valid_name = validation::non_blank(trip_name, "trip_name")?;
    validation::date_range(start_date, end_date)?;

    let mut trip = Trip::create(valid_name, start_date, end_date);
    trip.description = description.map(|d| d.trim().to_string()).unwrap_or_default();

    trip_repo::insert(conn, &trip)?;
    info!(trip = %trip.trip_name, days = trip.duration(), "trip added");
    Ok(trip)
}

pub fn update_trip(
    conn: &Connection,
    trip_id: Id<Trip>,
    trip_name: Option<&str>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    description: Option<&str>,
) -> BirdResult<Trip> {
    let mut trip = trip_repo::find_by_id(conn, trip_id)?
        .ok_or_else(|| BirdError::not_found("Trip", trip_id))?;

    if let Some(n) = trip_name {
        trip.trip_name = validation::non_blank(n, "trip_name")?;
    }
    if let Some(start) = start_date {
        trip.start_date = start;
    }
    if let Some(end) = end_date {
        trip.end_date = end;
    }
    if let Some(desc) = description {
        trip.description = desc.trim().to_string();
    }
    validation::date_range(trip.start_date, trip.end_date)?;

    trip_repo::update(conn, &trip)?;
    info!(trip = %trip.trip_name, "trip updated");
    Ok(trip)
}

/// Deletes a trip, keeping its sightings but detaching them from it.
/// Returns the deleted trip and the number of detached sightings.
pub fn delete_trip(conn: &Connection, trip_id: Id<Trip>) -> BirdResult<(Trip, usize)> {
    let trip = trip_repo::find_by_id(conn, trip_id)?
        .ok_or_else(|| BirdError::not_found("Trip", trip_id))?;

    let tx = conn.unchecked_transaction()?;
    let detached = trip_repo::delete(&tx, trip_id)?;
    tx.commit()?;

    info!(trip = %trip.trip_name, detached, "trip deleted");
    Ok((trip, detached))
}
