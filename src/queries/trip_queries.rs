use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::sighting_repo::{self, SightingFilter, SightingOrder};
use crate::db::{bird_repo, location_repo, trip_repo};
use crate::error::{BirdError, BirdResult};
use crate::model::{Bird, Id, Location, SightingDetail, Trip};

#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    /// Matched against name and description.
    pub search: Option<String>,
    /// Trips starting or ending in this year.
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripRow {
    #[serde(flatten)]
    pub trip: Trip,
    pub duration: i64,
    pub sighting_count: i64,
    pub first_sighting_date: Option<NaiveDate>,
    pub last_sighting_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    pub trip: Trip,
    pub duration: i64,
    pub sightings: Vec<SightingDetail>,
    pub unique_birds: Vec<Bird>,
    pub unique_locations: Vec<Location>,
    pub total_sightings: usize,
    pub first_sighting_date: Option<NaiveDate>,
    pub last_sighting_date: Option<NaiveDate>,
}

pub fn get_trip(conn: &Connection, trip_id: Id<Trip>) -> BirdResult<Trip> {
    trip_repo::find_by_id(conn, trip_id)?.ok_or_else(|| BirdError::not_found("Trip", trip_id))
}

pub fn list(conn: &Connection, filter: &TripFilter) -> BirdResult<Vec<TripRow>> {
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    Ok(trip_repo::find_with_stats(conn, search, filter.year)?
        .into_iter()
        .map(|(trip, sighting_count, first, last)| TripRow {
            duration: trip.duration(),
            trip,
            sighting_count,
            first_sighting_date: first,
            last_sighting_date: last,
        })
        .collect())
}

/// Distinct trip start years, newest first.
pub fn available_years(conn: &Connection) -> BirdResult<Vec<i32>> {
    trip_repo::find_start_years(conn)
}

pub fn detail(conn: &Connection, trip_id: Id<Trip>) -> BirdResult<TripDetail> {
    let trip = get_trip(conn, trip_id)?;

    let filter = SightingFilter {
        trip_id: Some(trip_id),
        ..SightingFilter::default()
    };
    let sightings = sighting_repo::find(conn, &filter, SightingOrder::RecentByBird)?;

    let bird_ids: HashSet<Id<Bird>> = sightings.iter().map(|s| s.sighting.bird_id).collect();
    let mut unique_birds = Vec::with_capacity(bird_ids.len());
    for id in bird_ids {
        if let Some(bird) = bird_repo::find_by_id(conn, id)? {
            unique_birds.push(bird);
        }
    }
    unique_birds.sort_by(|a, b| a.english_name.cmp(&b.english_name));

    let location_ids: HashSet<Id<Location>> = sightings.iter().map(|s| s.sighting.location_id).collect();
    let mut unique_locations = Vec::with_capacity(location_ids.len());
    for id in location_ids {
        if let Some(location) = location_repo::find_by_id(conn, id)? {
            unique_locations.push(location);
        }
    }
    unique_locations.sort_by(|a, b| a.location_name.cmp(&b.location_name));

    let first_sighting_date = sightings.iter().map(|s| s.sighting.date_seen).min();
    let last_sighting_date = sightings.iter().map(|s| s.sighting.date_seen).max();

    Ok(TripDetail {
        duration: trip.duration(),
        trip,
        total_sightings: sightings.len(),
        sightings,
        unique_birds,
        unique_locations,
        first_sighting_date,
        last_sighting_date,
    })
}
