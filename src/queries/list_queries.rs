use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use super::period::{month_name, Period};
use crate::db::sighting_repo::{self, SightingFilter, SightingOrder};
use crate::db::{bird_repo, location_repo};
use crate::error::{BirdError, BirdResult};
use crate::model::{Bird, Id, Location, SightingDetail};

/// One species on a life, year or month list.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub bird: Bird,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub total_sightings: i64,
    pub first_sighting: SightingDetail,
    /// Seen on a single day only within the period.
    pub is_recent: bool,
    /// The species' first ever sighting falls inside the period.
    pub is_lifelist_addition: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodStats {
    pub total_sightings: i64,
    pub unique_species: i64,
    /// Species seen in the period and never before its start.
    pub new_species: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub sightings: i64,
    pub species: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: u32,
    pub month_name: &'static str,
    pub sightings: i64,
    pub species: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearMonths {
    pub year: i32,
    pub total_sightings: i64,
    pub total_species: i64,
    pub months: Vec<MonthSummary>,
}

/// A species seen at a location or anywhere beneath it.
#[derive(Debug, Clone, Serialize)]
pub struct LocationSpecies {
    pub bird: Bird,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub total_sightings: i64,
    pub first_sighting: SightingDetail,
    pub latest_sighting: SightingDetail,
    pub is_recent_only: bool,
}

struct SpeciesTally {
    bird_id: Id<Bird>,
    total: i64,
    first: SightingDetail,
    latest: SightingDetail,
}

/// Groups sightings by species. The first sighting of each species is the
/// earliest-entered one on its earliest date.
fn tally(sightings: Vec<SightingDetail>) -> Vec<SpeciesTally> {
    let mut by_bird: HashMap<Id<Bird>, SpeciesTally> = HashMap::new();

    // `Recent` order is newest first, so walking it backwards visits
    // sightings oldest first.
    for detail in sightings.into_iter().rev() {
        let bird_id = detail.sighting.bird_id;
        match by_bird.get_mut(&bird_id) {
            Some(t) => {
                t.total += 1;
                t.latest = detail;
            }
            None => {
                by_bird.insert(
                    bird_id,
                    SpeciesTally {
                        bird_id,
                        total: 1,
                        first: detail.clone(),
                        latest: detail,
                    },
                );
            }
        }
    }

    by_bird.into_values().collect()
}

fn birds_by_id(conn: &Connection) -> BirdResult<HashMap<Id<Bird>, Bird>> {
    Ok(bird_repo::find_all(conn)?
        .into_iter()
        .map(|b| (b.id, b))
        .collect())
}

fn list_entries(conn: &Connection, period: Period) -> BirdResult<Vec<ListEntry>> {
    let sightings = sighting_repo::find(conn, &period.filter(), SightingOrder::Recent)?;
    let mut birds = birds_by_id(conn)?;
    let first_ever: HashMap<Id<Bird>, NaiveDate> =
        sighting_repo::first_seen_dates(conn)?.into_iter().collect();

    let mut entries: Vec<ListEntry> = tally(sightings)
        .into_iter()
        .filter_map(|t| {
            let bird = birds.remove(&t.bird_id)?;
            let first_seen = t.first.sighting.date_seen;
            let last_seen = t.latest.sighting.date_seen;
            let is_lifelist_addition = first_ever
                .get(&t.bird_id)
                .map_or(true, |d| *d >= first_seen);
            Some(ListEntry {
                bird,
                first_seen,
                last_seen,
                total_sightings: t.total,
                first_sighting: t.first,
                is_recent: first_seen == last_seen,
                is_lifelist_addition,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.last_seen
            .cmp(&a.last_seen)
            .then_with(|| a.bird.english_name.cmp(&b.bird.english_name))
    });

    debug!(period = %period.label(), species = entries.len(), "list computed");
    Ok(entries)
}

/// Every species ever seen.
pub fn life_list(conn: &Connection) -> BirdResult<Vec<ListEntry>> {
    list_entries(conn, Period::AllTime)
}

pub fn period_list(conn: &Connection, period: Period) -> BirdResult<Vec<ListEntry>> {
    list_entries(conn, period)
}

pub fn period_stats(conn: &Connection, period: Period) -> BirdResult<PeriodStats> {
    let filter = period.filter();
    let total_sightings = sighting_repo::count(conn, &filter)?;
    let seen = sighting_repo::distinct_bird_ids(conn, &filter)?;

    let new_species = match period.start() {
        None => seen.len() as i64,
        Some(start) => {
            let before = sighting_repo::distinct_bird_ids(conn, &SightingFilter::between(None, Some(start)))?;
            seen.difference(&before).count() as i64
        }
    };

    Ok(PeriodStats {
        total_sightings,
        unique_species: seen.len() as i64,
        new_species,
    })
}

/// Sighting and species counts per year, newest first.
pub fn year_summaries(conn: &Connection) -> BirdResult<Vec<YearSummary>> {
    Ok(sighting_repo::year_counts(conn)?
        .into_iter()
        .map(|(year, sightings, species)| YearSummary { year, sightings, species })
        .collect())
}

/// Per-month counts grouped under their year, both newest first.
pub fn month_summaries(conn: &Connection) -> BirdResult<Vec<YearMonths>> {
    let year_species: HashMap<i32, i64> = sighting_repo::year_counts(conn)?
        .into_iter()
        .map(|(year, _, species)| (year, species))
        .collect();

    let mut by_year: BTreeMap<i32, Vec<MonthSummary>> = BTreeMap::new();
    for (year, month, sightings, species) in sighting_repo::month_counts(conn)? {
        by_year.entry(year).or_default().push(MonthSummary {
            month,
            month_name: month_name(month),
            sightings,
            species,
        });
    }

    Ok(by_year
        .into_iter()
        .rev()
        .map(|(year, months)| YearMonths {
            year,
            total_sightings: months.iter().map(|m| m.sightings).sum(),
            total_species: year_species.get(&year).copied().unwrap_or(0),
            months,
        })
        .collect())
}

pub fn total_species(conn: &Connection) -> BirdResult<i64> {
    sighting_repo::count_distinct_birds(conn, &SightingFilter::default())
}

/// Species seen at a location or any of its descendants, most recently seen first.
pub fn location_species(conn: &Connection, location_id: Id<Location>) -> BirdResult<Vec<LocationSpecies>> {
    location_repo::find_by_id(conn, location_id)?
        .ok_or_else(|| BirdError::not_found("Location", location_id))?;

    let filter = SightingFilter {
        location_subtree: Some(location_id),
        ..SightingFilter::default()
    };
    let sightings = sighting_repo::find(conn, &filter, SightingOrder::Recent)?;
    let mut birds = birds_by_id(conn)?;

    let mut species: Vec<LocationSpecies> = tally(sightings)
        .into_iter()
        .filter_map(|t| {
            let bird = birds.remove(&t.bird_id)?;
            let first_seen = t.first.sighting.date_seen;
            let last_seen = t.latest.sighting.date_seen;
            Some(LocationSpecies {
                bird,
                first_seen,
                last_seen,
                total_sightings: t.total,
                first_sighting: t.first,
                latest_sighting: t.latest,
                is_recent_only: first_seen == last_seen,
            })
        })
        .collect();

    species.sort_by(|a, b| {
        b.last_seen
            .cmp(&a.last_seen)
            .then_with(|| a.bird.english_name.cmp(&b.bird.english_name))
    });

    Ok(species)
}
