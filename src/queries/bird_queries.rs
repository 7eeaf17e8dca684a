use std::collections::BTreeSet;

use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use super::location_queries::{SEARCH_LIMIT, SEARCH_MIN_CHARS};
use crate::db::sighting_repo::{self, SightingFilter, SightingOrder};
use crate::db::{bird_repo, family_repo};
use crate::error::{BirdError, BirdResult};
use crate::model::{Bird, Family, Id, SightingDetail};

#[derive(Debug, Clone, Serialize)]
pub struct BirdSearchResult {
    pub id: Id<Bird>,
    pub english_name: String,
    pub latin_name: Option<String>,
    pub display_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct BirdFilter {
    /// Matched against English, Latin and French names.
    pub search: Option<String>,
    pub family_id: Option<Id<Family>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BirdRow {
    #[serde(flatten)]
    pub bird: Bird,
    pub family_name: Option<String>,
    pub sighting_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BirdDetail {
    pub bird: Bird,
    pub family: Option<Family>,
    pub sightings: Vec<SightingDetail>,
    pub total_sightings: usize,
    pub first_sighting: Option<SightingDetail>,
    pub latest_sighting: Option<SightingDetail>,
    /// Distinct names of the places the bird was seen, sorted.
    pub locations: Vec<String>,
}

pub fn get_bird(conn: &Connection, bird_id: Id<Bird>) -> BirdResult<Bird> {
    bird_repo::find_by_id(conn, bird_id)?.ok_or_else(|| BirdError::not_found("Bird", bird_id))
}

/// English-name search for autocomplete. Queries shorter than two
/// characters return nothing.
pub fn search(conn: &Connection, query: &str) -> BirdResult<Vec<BirdSearchResult>> {
    let query = query.trim();
    if query.chars().count() < SEARCH_MIN_CHARS {
        return Ok(Vec::new());
    }

    let results: Vec<BirdSearchResult> = bird_repo::search_by_english_name(conn, query, SEARCH_LIMIT)?
        .into_iter()
        .map(|b| BirdSearchResult {
            display_name: b.display_name(),
            id: b.id,
            english_name: b.english_name,
            latin_name: b.latin_name,
        })
        .collect();

    debug!(query, results = results.len(), "bird search");
    Ok(results)
}

pub fn list(conn: &Connection, filter: &BirdFilter) -> BirdResult<Vec<BirdRow>> {
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = bird_repo::find_with_counts(conn, search, filter.family_id)?;

    Ok(rows
        .into_iter()
        .map(|(bird, family_name, sighting_count)| BirdRow {
            bird,
            family_name,
            sighting_count,
        })
        .collect())
}

pub fn detail(conn: &Connection, bird_id: Id<Bird>) -> BirdResult<BirdDetail> {
    let bird = get_bird(conn, bird_id)?;
    let family = match bird.family_id {
        Some(fid) => family_repo::find_by_id(conn, fid)?,
        None => None,
    };

    let filter = SightingFilter {
        bird_id: Some(bird_id),
        ..SightingFilter::default()
    };
    let sightings = sighting_repo::find(conn, &filter, SightingOrder::Recent)?;
    let locations: BTreeSet<String> = sightings.iter().map(|s| s.location_name.clone()).collect();

    Ok(BirdDetail {
        bird,
        family,
        total_sightings: sightings.len(),
        first_sighting: sightings.last().cloned(),
        latest_sighting: sightings.first().cloned(),
        locations: locations.into_iter().collect(),
        sightings,
    })
}
