use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::db::location_repo;
use crate::db::sighting_repo::{self, SightingFilter, SightingOrder};
use crate::error::{BirdError, BirdResult};
use crate::model::location::join_path;
use crate::model::{Id, Location, SightingDetail};

pub const SEARCH_MIN_CHARS: usize = 2;
pub const SEARCH_LIMIT: usize = 20;
const RECENT_SIGHTINGS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct LocationSearchResult {
    pub id: Id<Location>,
    pub name: String,
    pub full_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub search: Option<String>,
    pub parent_id: Option<Id<Location>>,
    pub top_level_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationRow {
    #[serde(flatten)]
    pub location: Location,
    pub parent_name: Option<String>,
    pub sighting_count: i64,
    pub child_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildLocation {
    #[serde(flatten)]
    pub location: Location,
    /// Sightings at the child or anywhere beneath it.
    pub sighting_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationDetail {
    pub location: Location,
    pub full_path: String,
    /// Root first, ending with the location itself.
    pub breadcrumb: Vec<Location>,
    pub children: Vec<ChildLocation>,
    pub descendant_count: usize,
    pub total_sightings: i64,
    pub unique_species: i64,
    pub first_sighting: Option<SightingDetail>,
    pub latest_sighting: Option<SightingDetail>,
    pub recent_sightings: Vec<SightingDetail>,
}

pub fn get_location(conn: &Connection, location_id: Id<Location>) -> BirdResult<Location> {
    location_repo::find_by_id(conn, location_id)?
        .ok_or_else(|| BirdError::not_found("Location", location_id))
}

/// Root-first ancestors, excluding the location itself.
pub fn ancestors(conn: &Connection, location: &Location) -> BirdResult<Vec<Location>> {
    location_repo::find_ancestors(conn, location)
}

/// Names from the root down to the location itself.
pub fn full_path(conn: &Connection, location: &Location) -> BirdResult<Vec<String>> {
    let mut names: Vec<String> = ancestors(conn, location)?
        .into_iter()
        .map(|l| l.location_name)
        .collect();
    names.push(location.location_name.clone());
    Ok(names)
}

pub fn full_path_string(conn: &Connection, location: &Location) -> BirdResult<String> {
    Ok(join_path(&full_path(conn, location)?))
}

/// Every location beneath `location_id`, at any depth, ordered by name.
pub fn descendants(conn: &Connection, location_id: Id<Location>) -> BirdResult<Vec<Location>> {
    let ids: HashSet<Id<Location>> = location_repo::descendant_ids(conn, location_id)?
        .into_iter()
        .collect();
    Ok(location_repo::find_all(conn)?
        .into_iter()
        .filter(|l| ids.contains(&l.id))
        .collect())
}

/// Name search for autocomplete. Queries shorter than two characters return nothing.
pub fn search(conn: &Connection, query: &str) -> BirdResult<Vec<LocationSearchResult>> {
    let query = query.trim();
    if query.chars().count() < SEARCH_MIN_CHARS {
        return Ok(Vec::new());
    }

    let results = location_repo::search_by_name(conn, query, SEARCH_LIMIT)?
        .into_iter()
        .map(|l| {
            Ok(LocationSearchResult {
                full_path: full_path_string(conn, &l)?,
                id: l.id,
                name: l.location_name,
            })
        })
        .collect::<BirdResult<Vec<_>>>()?;

    debug!(query, results = results.len(), "location search");
    Ok(results)
}

pub fn list(conn: &Connection, filter: &LocationFilter) -> BirdResult<Vec<LocationRow>> {
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = location_repo::find_with_counts(conn, search, filter.parent_id, filter.top_level_only)?;

    Ok(rows
        .into_iter()
        .map(|(location, parent_name, sighting_count, child_count)| LocationRow {
            location,
            parent_name,
            sighting_count,
            child_count,
        })
        .collect())
}

fn subtree_filter(location_id: Id<Location>) -> SightingFilter {
    SightingFilter {
        location_subtree: Some(location_id),
        ..SightingFilter::default()
    }
}

/// Sightings at the location or beneath it, most recent first.
pub fn sightings(conn: &Connection, location_id: Id<Location>) -> BirdResult<Vec<SightingDetail>> {
    get_location(conn, location_id)?;
    sighting_repo::find(conn, &subtree_filter(location_id), SightingOrder::Recent)
}

pub fn detail(conn: &Connection, location_id: Id<Location>) -> BirdResult<LocationDetail> {
    let location = get_location(conn, location_id)?;

    let mut breadcrumb = ancestors(conn, &location)?;
    breadcrumb.push(location.clone());
    let full_path = join_path(
        &breadcrumb
            .iter()
            .map(|l| l.location_name.clone())
            .collect::<Vec<_>>(),
    );

    let children = location_repo::find_children(conn, location_id)?
        .into_iter()
        .map(|child| {
            let sighting_count = sighting_repo::count(conn, &subtree_filter(child.id))?;
            Ok(ChildLocation {
                location: child,
                sighting_count,
            })
        })
        .collect::<BirdResult<Vec<_>>>()?;

    let filter = subtree_filter(location_id);
    let sightings = sighting_repo::find(conn, &filter, SightingOrder::Recent)?;
    let unique_species = sighting_repo::count_distinct_birds(conn, &filter)?;
    let descendant_count = location_repo::descendant_ids(conn, location_id)?.len();

    Ok(LocationDetail {
        total_sightings: sightings.len() as i64,
        unique_species,
        first_sighting: sightings.last().cloned(),
        latest_sighting: sightings.first().cloned(),
        recent_sightings: sightings.into_iter().take(RECENT_SIGHTINGS).collect(),
        location,
        full_path,
        breadcrumb,
        children,
        descendant_count,
    })
}
