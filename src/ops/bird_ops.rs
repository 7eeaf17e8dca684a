use rusqlite::Connection;
use tracing::info;

use super::BulkDeleteOutcome;
use crate::db::{bird_repo, family_repo};
use crate::error::{BirdError, BirdResult};
use crate::model::{Bird, Family, Id};
use crate::validation::{self, trim_optional};

fn ensure_family(conn: &Connection, family_id: Option<Id<Family>>) -> BirdResult<()> {
    if let Some(fid) = family_id {
        family_repo::find_by_id(conn, fid)?.ok_or_else(|| BirdError::not_found("Family", fid))?;
    }
    Ok(())
}

pub fn add_bird(
    conn: &Connection,
    english_name: &str,
    latin_name: Option<&str>,
    french_name: Option<&str>,
    species_status: Option<&str>,
    family_id: Option<Id<Family>>,
) -> BirdResult<Bird> {
    let valid_name = validation::non_blank(english_name, "english_name")?;
    ensure_family(conn, family_id)?;

    let mut bird = Bird::create(valid_name);
    bird.latin_name = trim_optional(latin_name);
    bird.french_name = trim_optional(french_name);
    bird.species_status = trim_optional(species_status);
    bird.family_id = family_id;

    bird_repo::insert(conn, &bird)?;
    info!(bird = %bird.english_name, "bird added");
    Ok(bird)
}

pub fn update_bird(
    conn: &Connection,
    bird_id: Id<Bird>,
    english_name: Option<&str>,
    latin_name: Option<Option<&str>>,
    french_name: Option<Option<&str>>,
    species_status: Option<Option<&str>>,
    family_id: Option<Option<Id<Family>>>,
) -> BirdResult<Bird> {
    let mut bird = bird_repo::find_by_id(conn, bird_id)?
        .ok_or_else(|| BirdError::not_found("Bird", bird_id))?;

    if let Some(n) = english_name {
        bird.english_name = validation::non_blank(n, "english_name")?;
    }
    if let Some(latin) = latin_name {
        bird.latin_name = trim_optional(latin);
    }
    if let Some(french) = french_name {
        bird.french_name = trim_optional(french);
    }
    if let Some(status) = species_status {
        bird.species_status = trim_optional(status);
    }
    if let Some(fid) = family_id {
        ensure_family(conn, fid)?;
        bird.family_id = fid;
    }

    bird_repo::update(conn, &bird)?;
    info!(bird = %bird.english_name, "bird updated");
    Ok(bird)
}

/// Deletes a bird with no recorded sightings. Returns the deleted bird.
pub fn delete_bird(conn: &Connection, bird_id: Id<Bird>) -> BirdResult<Bird> {
    let bird = bird_repo::find_by_id(conn, bird_id)?
        .ok_or_else(|| BirdError::not_found("Bird", bird_id))?;

    let sighting_count = bird_repo::count_sightings(conn, bird_id)?;
    if sighting_count > 0 {
        return Err(BirdError::HasDependents {
            name: bird.english_name.clone(),
            count: sighting_count,
            dependents: "sighting(s)".into(),
            hint: "Please delete the sightings first.".into(),
        });
    }

    bird_repo::delete(conn, bird_id)?;
    info!(bird = %bird.english_name, "bird deleted");
    Ok(bird)
}

/// Deletes every selected bird, or none of them if any has sightings.
/// Ids that match no bird are skipped.
pub fn bulk_delete_birds(conn: &Connection, bird_ids: &[Id<Bird>]) -> BirdResult<BulkDeleteOutcome> {
    validation::non_empty_set(bird_ids, "selected_birds")?;

    let mut blocked = Vec::new();
    let mut to_delete = Vec::new();

    for id in bird_ids {
        let Some(bird) = bird_repo::find_by_id(conn, *id)? else {
            continue;
        };
        let sighting_count = bird_repo::count_sightings(conn, bird.id)?;
        if sighting_count > 0 {
            blocked.push(format!("\"{}\" ({} sightings)", bird.english_name, sighting_count));
        } else {
            to_delete.push(bird);
        }
    }

    if !blocked.is_empty() {
        return Err(BirdError::BulkDeleteBlocked(format!(
            "Cannot delete the following birds because they have sightings: {}. Please delete their sightings first.",
            blocked.join(", ")
        )));
    }

    let tx = conn.unchecked_transaction()?;
    for bird in &to_delete {
        bird_repo::delete(&tx, bird.id)?;
    }
    tx.commit()?;

    let deleted: Vec<String> = to_delete.into_iter().map(|b| b.english_name).collect();
    info!(count = deleted.len(), "birds bulk deleted");
    Ok(BulkDeleteOutcome { deleted })
}
