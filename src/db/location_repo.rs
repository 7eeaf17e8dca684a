use std::collections::HashSet;

use rusqlite::{params, params_from_iter, Connection};

use super::{like_pattern, parse_id, parse_optional_id};
use crate::error::BirdResult;
use crate::model::{Id, Location};

/// Recursive CTE named `subtree(id)` holding the location bound to
/// `?{param}` and all of its descendants. `UNION` (not `UNION ALL`) keeps
/// the recursion finite even if the parent chain were ever cyclic.
pub(crate) fn subtree_cte(param: usize) -> String {
    format!(
        "subtree(id) AS (
            SELECT ?{param}
            UNION
            SELECT l.id FROM locations l JOIN subtree t ON l.parent_id = t.id
        )"
    )
}

pub fn insert(conn: &Connection, location: &Location) -> BirdResult<()> {
    conn.execute(
        "INSERT INTO locations (id, location_name, parent_id) VALUES (?1, ?2, ?3)",
        params![
            location.id.value.to_string(),
            location.location_name,
            location.parent_id.map(|p| p.value.to_string()),
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, location: &Location) -> BirdResult<()> {
    conn.execute(
        "UPDATE locations SET location_name = ?1, parent_id = ?2 WHERE id = ?3",
        params![
            location.location_name,
            location.parent_id.map(|p| p.value.to_string()),
            location.id.value.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Location>) -> BirdResult<()> {
    conn.execute(
        "DELETE FROM locations WHERE id = ?1",
        params![id.value.to_string()],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Location>) -> BirdResult<Option<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, location_name, parent_id FROM locations WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.value.to_string()], |row| Ok(row_to_location(row)));

    match result {
        Ok(location) => Ok(Some(location?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_all(conn: &Connection) -> BirdResult<Vec<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, location_name, parent_id FROM locations ORDER BY location_name",
    )?;

    let locations = stmt
        .query_map([], |row| Ok(row_to_location(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(locations)
}

/// Direct children of a location, ordered by name.
pub fn find_children(conn: &Connection, parent_id: Id<Location>) -> BirdResult<Vec<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, location_name, parent_id FROM locations WHERE parent_id = ?1
         ORDER BY location_name",
    )?;

    let locations = stmt
        .query_map(params![parent_id.value.to_string()], |row| Ok(row_to_location(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(locations)
}

/// Exact (case-insensitive) name lookup among the children of `parent_id`,
/// or among top-level locations when `parent_id` is None.
pub fn find_by_name_and_parent(
    conn: &Connection,
    name: &str,
    parent_id: Option<Id<Location>>,
) -> BirdResult<Option<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, location_name, parent_id FROM locations
         WHERE LOWER(location_name) = LOWER(?1) AND parent_id IS ?2
         ORDER BY location_name LIMIT 1",
    )?;

    let result = stmt.query_row(
        params![name, parent_id.map(|p| p.value.to_string())],
        |row| Ok(row_to_location(row)),
    );

    match result {
        Ok(location) => Ok(Some(location?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn search_by_name(conn: &Connection, query: &str, limit: usize) -> BirdResult<Vec<Location>> {
    let mut stmt = conn.prepare(
        "SELECT id, location_name, parent_id FROM locations WHERE LOWER(location_name) LIKE ?1 ESCAPE '\\'
         ORDER BY location_name LIMIT ?2",
    )?;

    let locations = stmt
        .query_map(params![like_pattern(query), limit as i64], |row| Ok(row_to_location(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(locations)
}

/// Ids of all descendants of `id` (not including `id` itself).
pub fn descendant_ids(conn: &Connection, id: Id<Location>) -> BirdResult<Vec<Id<Location>>> {
    let sql = format!(
        "WITH RECURSIVE {} SELECT id FROM subtree WHERE id != ?1",
        subtree_cte(1)
    );
    let mut stmt = conn.prepare(&sql)?;

    let ids = stmt
        .query_map(params![id.value.to_string()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .map(|s| parse_id(s))
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(ids)
}

/// Walks the parent chain upward. Returns ancestors root-first, not
/// including the location itself. Stops if the chain loops back on itself.
pub fn find_ancestors(conn: &Connection, location: &Location) -> BirdResult<Vec<Location>> {
    let mut ancestors = Vec::new();
    let mut seen = HashSet::from([location.id]);
    let mut next = location.parent_id;

    while let Some(parent_id) = next {
        if !seen.insert(parent_id) {
            break;
        }
        match find_by_id(conn, parent_id)? {
            Some(parent) => {
                next = parent.parent_id;
                ancestors.push(parent);
            }
            None => break,
        }
    }

    ancestors.reverse();
    Ok(ancestors)
}

/// Locations filtered by name substring, parent and top-level flag, each with
/// parent name, direct sighting count and direct child count.
pub fn find_with_counts(
    conn: &Connection,
    search: Option<&str>,
    parent_id: Option<Id<Location>>,
    top_level_only: bool,
) -> BirdResult<Vec<(Location, Option<String>, i64, i64)>> {
    let mut clauses = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(term) = search {
        args.push(like_pattern(term));
        clauses.push(format!("LOWER(l.location_name) LIKE ?{} ESCAPE '\\'", args.len()));
    }
    if let Some(pid) = parent_id {
        args.push(pid.value.to_string());
        clauses.push(format!("l.parent_id = ?{}", args.len()));
    }
    if top_level_only {
        clauses.push("l.parent_id IS NULL".to_string());
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT l.id, l.location_name, l.parent_id, p.location_name,
                (SELECT COUNT(*) FROM sightings s WHERE s.location_id = l.id),
                (SELECT COUNT(*) FROM locations c WHERE c.parent_id = l.id)
         FROM locations l
         LEFT JOIN locations p ON p.id = l.parent_id
         {where_clause}
         ORDER BY l.location_name"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            let parent_name: Option<String> = row.get(3)?;
            let sightings: i64 = row.get(4)?;
            let children: i64 = row.get(5)?;
            Ok((row_to_location(row), parent_name, sightings, children))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(location, parent_name, sightings, children)| {
            Ok((location?, parent_name, sightings, children))
        })
        .collect()
}

pub fn count_sightings(conn: &Connection, id: Id<Location>) -> BirdResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sightings WHERE location_id = ?1",
        params![id.value.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_children(conn: &Connection, id: Id<Location>) -> BirdResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM locations WHERE parent_id = ?1",
        params![id.value.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_location(row: &rusqlite::Row) -> BirdResult<Location> {
    let id_str: String = row.get(0)?;
    let parent_str: Option<String> = row.get(2)?;
    Ok(Location {
        id: parse_id(&id_str)?,
        location_name: row.get(1)?,
        parent_id: parse_optional_id(parent_str)?,
    })
}
