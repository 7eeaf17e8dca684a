use rusqlite::Connection;

use super::period::Period;
use crate::db::sighting_repo::{self, SightingFilter, SightingOrder};
use crate::error::{BirdError, BirdResult};
use crate::model::{Id, Sighting, SightingDetail};

pub fn get_sighting(conn: &Connection, sighting_id: Id<Sighting>) -> BirdResult<SightingDetail> {
    sighting_repo::find_by_id(conn, sighting_id)?
        .ok_or_else(|| BirdError::not_found("Sighting", sighting_id))
}

/// All sightings, or those of one year, most recent first. A year no date
/// can fall in has no sightings.
pub fn list(conn: &Connection, year: Option<i32>) -> BirdResult<Vec<SightingDetail>> {
    let filter = match year.map(Period::year) {
        Some(period @ Period::Year { .. }) => period.filter(),
        Some(_) => return Ok(Vec::new()),
        None => SightingFilter::default(),
    };
    sighting_repo::find(conn, &filter, SightingOrder::Recent)
}

/// Years with at least one sighting, newest first.
pub fn available_years(conn: &Connection) -> BirdResult<Vec<i32>> {
    Ok(sighting_repo::year_counts(conn)?
        .into_iter()
        .map(|(year, _, _)| year)
        .collect())
}
