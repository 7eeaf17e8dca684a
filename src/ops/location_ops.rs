use rusqlite::Connection;
use tracing::info;

use super::BulkDeleteOutcome;
use crate::db::location_repo;
use crate::error::{BirdError, BirdResult};
use crate::model::{Id, Location};
use crate::validation;

pub fn add_location(
    conn: &Connection,
    location_name: &str,
    parent_id: Option<Id<Location>>,
) -> BirdResult<Location> {
    let valid_name = validation::non_blank(location_name, "location_name")?;
    if let Some(pid) = parent_id {
        location_repo::find_by_id(conn, pid)?
            .ok_or_else(|| BirdError::not_found("Location", pid))?;
    }

    let location = Location::create(valid_name, parent_id);
    location_repo::insert(conn, &location)?;
    info!(location = %location.location_name, "location added");
    Ok(location)
}

pub fn update_location(
    conn: &Connection,
    location_id: Id<Location>,
    location_name: Option<&str>,
    parent_id: Option<Option<Id<Location>>>,
) -> BirdResult<Location> {
    let mut location = location_repo::find_by_id(conn, location_id)?
        .ok_or_else(|| BirdError::not_found("Location", location_id))?;

    if let Some(n) = location_name {
        location.location_name = validation::non_blank(n, "location_name")?;
    }
    if let Some(new_parent) = parent_id {
        if let Some(pid) = new_parent {
            let parent = location_repo::find_by_id(conn, pid)?
                .ok_or_else(|| BirdError::not_found("Location", pid))?;
            ensure_not_descendant(conn, location_id, &parent)?;
        }
        location.parent_id = new_parent;
    }

    location_repo::update(conn, &location)?;
    info!(location = %location.location_name, "location updated");
    Ok(location)
}

/// Fails if `candidate_parent` is `location_id` itself or lies beneath it.
fn ensure_not_descendant(
    conn: &Connection,
    location_id: Id<Location>,
    candidate_parent: &Location,
) -> BirdResult<()> {
    if candidate_parent.id == location_id {
        return Err(BirdError::CircularParent);
    }
    let chain = location_repo::find_ancestors(conn, candidate_parent)?;
    if chain.iter().any(|l| l.id == location_id) {
        return Err(BirdError::CircularParent);
    }
    Ok(())
}

/// Deletes a location with no sightings and no child locations.
pub fn delete_location(conn: &Connection, location_id: Id<Location>) -> BirdResult<Location> {
    let location = location_repo::find_by_id(conn, location_id)?
        .ok_or_else(|| BirdError::not_found("Location", location_id))?;

    let sighting_count = location_repo::count_sightings(conn, location_id)?;
    if sighting_count > 0 {
        return Err(BirdError::HasDependents {
            name: location.location_name.clone(),
            count: sighting_count,
            dependents: "sighting(s)".into(),
            hint: "Please delete or reassign the sightings first.".into(),
        });
    }

    let child_count = location_repo::count_children(conn, location_id)?;
    if child_count > 0 {
        return Err(BirdError::HasDependents {
            name: location.location_name.clone(),
            count: child_count,
            dependents: "child location(s)".into(),
            hint: "Please delete or reassign the child locations first.".into(),
        });
    }

    location_repo::delete(conn, location_id)?;
    info!(location = %location.location_name, "location deleted");
    Ok(location)
}

/// Deletes every selected location, or none if any still has sightings or
/// child locations.
pub fn bulk_delete_locations(
    conn: &Connection,
    location_ids: &[Id<Location>],
) -> BirdResult<BulkDeleteOutcome> {
    validation::non_empty_set(location_ids, "selected_locations")?;

    let mut with_sightings = Vec::new();
    let mut with_children = Vec::new();
    let mut to_delete = Vec::new();

    for id in location_ids {
        let Some(location) = location_repo::find_by_id(conn, *id)? else {
            continue;
        };
        let sighting_count = location_repo::count_sightings(conn, location.id)?;
        let child_count = location_repo::count_children(conn, location.id)?;

        if sighting_count > 0 {
            with_sightings.push(format!("\"{}\" ({} sightings)", location.location_name, sighting_count));
        } else if child_count > 0 {
            with_children.push(format!("\"{}\" ({} children)", location.location_name, child_count));
        } else {
            to_delete.push(location);
        }
    }

    let mut problems = Vec::new();
    if !with_sightings.is_empty() {
        problems.push(format!(
            "Cannot delete locations with sightings: {}",
            with_sightings.join(", ")
        ));
    }
    if !with_children.is_empty() {
        problems.push(format!(
            "Cannot delete locations with child locations: {}",
            with_children.join(", ")
        ));
    }
    if !problems.is_empty() {
        return Err(BirdError::BulkDeleteBlocked(format!(
            "{}. Please delete or reassign them first.",
            problems.join(". ")
        )));
    }

    let tx = conn.unchecked_transaction()?;
    for location in &to_delete {
        location_repo::delete(&tx, location.id)?;
    }
    tx.commit()?;

    let deleted: Vec<String> = to_delete.into_iter().map(|l| l.location_name).collect();
    info!(count = deleted.len(), "locations bulk deleted");
    Ok(BulkDeleteOutcome { deleted })
}
