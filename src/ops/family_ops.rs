use rusqlite::Connection;
use tracing::info;

use crate::db::family_repo;
use crate::error::{BirdError, BirdResult};
use crate::model::{Family, Id};
use crate::validation::{self, trim_optional};

pub fn add_family(
    conn: &Connection,
    family_name: &str,
    subfamily_name: Option<&str>,
) -> BirdResult<Family> {
    let valid_name = validation::non_blank(family_name, "family_name")?;
    let family = Family::create(valid_name, trim_optional(subfamily_name));

    family_repo::insert(conn, &family)?;
    info!(family = %family.display_name(), "family added");
    Ok(family)
}

pub fn update_family(
    conn: &Connection,
    family_id: Id<Family>,
    family_name: Option<&str>,
    subfamily_name: Option<Option<&str>>,
) -> BirdResult<Family> {
    let mut family = family_repo::find_by_id(conn, family_id)?
        .ok_or_else(|| BirdError::not_found("Family", family_id))?;

    if let Some(n) = family_name {
        family.family_name = validation::non_blank(n, "family_name")?;
    }
    if let Some(sub) = subfamily_name {
        family.subfamily_name = trim_optional(sub);
    }

    family_repo::update(conn, &family)?;
    info!(family = %family.display_name(), "family updated");
    Ok(family)
}

/// Deletes a family that no bird belongs to. Returns the deleted family.
pub fn delete_family(conn: &Connection, family_id: Id<Family>) -> BirdResult<Family> {
    let family = family_repo::find_by_id(conn, family_id)?
        .ok_or_else(|| BirdError::not_found("Family", family_id))?;

    let bird_count = family_repo::count_birds(conn, family_id)?;
    if bird_count > 0 {
        return Err(BirdError::HasDependents {
            name: family.family_name.clone(),
            count: bird_count,
            dependents: "bird(s)".into(),
            hint: "Please reassign or delete the birds first.".into(),
        });
    }

    family_repo::delete(conn, family_id)?;
    info!(family = %family.display_name(), "family deleted");
    Ok(family)
}
