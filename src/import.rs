use std::path::Path;

use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, info};

use crate::db::{bird_repo, family_repo, location_repo};
use crate::error::BirdResult;
use crate::model::{Family, Id, Location};
use crate::ops::{bird_ops, family_ops, location_ops};

/// A checklist file: taxonomy plus a tree of places.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Checklist {
    pub families: Vec<ChecklistFamily>,
    /// Species without a family.
    pub birds: Vec<ChecklistBird>,
    pub locations: Vec<ChecklistLocation>,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistFamily {
    pub family_name: String,
    #[serde(default)]
    pub subfamily_name: Option<String>,
    #[serde(default)]
    pub birds: Vec<ChecklistBird>,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistBird {
    pub english_name: String,
    #[serde(default)]
    pub latin_name: Option<String>,
    #[serde(default)]
    pub french_name: Option<String>,
    #[serde(default)]
    pub species_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistLocation {
    pub location_name: String,
    #[serde(default)]
    pub children: Vec<ChecklistLocation>,
}

/// Records created by an import. Entries that already existed are counted
/// in `reused`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub families: usize,
    pub birds: usize,
    pub locations: usize,
    pub reused: usize,
}

/// Reads a JSON checklist from `path` and imports it.
pub fn import_file(conn: &Connection, path: &Path) -> BirdResult<ImportStats> {
    let json_str = std::fs::read_to_string(path)?;
    let checklist: Checklist = serde_json::from_str(&json_str)?;
    import_checklist(conn, &checklist)
}

/// Imports everything in one transaction. Families match on family and
/// subfamily name, birds on English name and locations on name under the
/// same parent, all ignoring case.
pub fn import_checklist(conn: &Connection, checklist: &Checklist) -> BirdResult<ImportStats> {
    let tx = conn.unchecked_transaction()?;
    let mut stats = ImportStats::default();

    for family in &checklist.families {
        let family_id = import_family(&tx, family, &mut stats)?;
        for bird in &family.birds {
            import_bird(&tx, bird, Some(family_id), &mut stats)?;
        }
    }
    for bird in &checklist.birds {
        import_bird(&tx, bird, None, &mut stats)?;
    }
    for location in &checklist.locations {
        import_location(&tx, location, None, &mut stats)?;
    }

    tx.commit()?;
    info!(
        families = stats.families,
        birds = stats.birds,
        locations = stats.locations,
        reused = stats.reused,
        "checklist imported"
    );
    Ok(stats)
}

fn import_family(
    conn: &Connection,
    entry: &ChecklistFamily,
    stats: &mut ImportStats,
) -> BirdResult<Id<Family>> {
    let name = entry.family_name.trim();
    let subfamily = entry
        .subfamily_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(existing) = family_repo::find_by_names(conn, name, subfamily)? {
        stats.reused += 1;
        return Ok(existing.id);
    }

    let family = family_ops::add_family(conn, name, subfamily)?;
    stats.families += 1;
    Ok(family.id)
}

fn import_bird(
    conn: &Connection,
    entry: &ChecklistBird,
    family_id: Option<Id<Family>>,
    stats: &mut ImportStats,
) -> BirdResult<()> {
    if bird_repo::find_by_english_name(conn, entry.english_name.trim())?.is_some() {
        debug!(bird = %entry.english_name, "bird already present");
        stats.reused += 1;
        return Ok(());
    }

    bird_ops::add_bird(
        conn,
        &entry.english_name,
        entry.latin_name.as_deref(),
        entry.french_name.as_deref(),
        entry.species_status.as_deref(),
        family_id,
    )?;
    stats.birds += 1;
    Ok(())
}

fn import_location(
    conn: &Connection,
    entry: &ChecklistLocation,
    parent_id: Option<Id<Location>>,
    stats: &mut ImportStats,
) -> BirdResult<()> {
    let name = entry.location_name.trim();

    let location_id = match location_repo::find_by_name_and_parent(conn, name, parent_id)? {
        Some(existing) => {
            stats.reused += 1;
            existing.id
        }
        None => {
            stats.locations += 1;
            location_ops::add_location(conn, name, parent_id)?.id
        }
    };

    for child in &entry.children {
        import_location(conn, child, Some(location_id), stats)?;
    }
    Ok(())
}
