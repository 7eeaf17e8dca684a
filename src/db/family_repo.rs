use rusqlite::{params, Connection};

use super::parse_id;
use crate::error::BirdResult;
use crate::model::{Family, Id};

pub fn insert(conn: &Connection, family: &Family) -> BirdResult<()> {
    conn.execute(
        "INSERT INTO families (id, family_name, subfamily_name) VALUES (?1, ?2, ?3)",
        params![
            family.id.value.to_string(),
            family.family_name,
            family.subfamily_name,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, family: &Family) -> BirdResult<()> {
    conn.execute(
        "UPDATE families SET family_name = ?1, subfamily_name = ?2 WHERE id = ?3",
        params![
            family.family_name,
            family.subfamily_name,
            family.id.value.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Family>) -> BirdResult<()> {
    conn.execute(
        "DELETE FROM families WHERE id = ?1",
        params![id.value.to_string()],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Family>) -> BirdResult<Option<Family>> {
    let mut stmt = conn.prepare(
        "SELECT id, family_name, subfamily_name FROM families WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.value.to_string()], |row| Ok(row_to_family(row)));

    match result {
        Ok(family) => Ok(Some(family?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_all(conn: &Connection) -> BirdResult<Vec<Family>> {
    let mut stmt = conn.prepare(
        "SELECT id, family_name, subfamily_name FROM families
         ORDER BY family_name, COALESCE(subfamily_name, '')",
    )?;

    let families = stmt
        .query_map([], |row| Ok(row_to_family(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(families)
}

/// Exact (case-insensitive) lookup on family and subfamily name.
pub fn find_by_names(
    conn: &Connection,
    family_name: &str,
    subfamily_name: Option<&str>,
) -> BirdResult<Option<Family>> {
    Ok(find_all(conn)?.into_iter().find(|f| {
        f.family_name.eq_ignore_ascii_case(family_name)
            && match (f.subfamily_name.as_deref(), subfamily_name) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                (None, None) => true,
                _ => false,
            }
    }))
}

/// Families ordered by name, each with the number of birds assigned to it.
pub fn find_all_with_bird_counts(conn: &Connection) -> BirdResult<Vec<(Family, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.family_name, f.subfamily_name, COUNT(b.id)
         FROM families f
         LEFT JOIN birds b ON b.family_id = f.id
         GROUP BY f.id
         ORDER BY f.family_name, COALESCE(f.subfamily_name, '')",
    )?;

    let rows = stmt
        .query_map([], |row| {
            let count: i64 = row.get(3)?;
            Ok((row_to_family(row), count))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(family, count)| Ok((family?, count)))
        .collect()
}

pub fn count_birds(conn: &Connection, id: Id<Family>) -> BirdResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM birds WHERE family_id = ?1",
        params![id.value.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_family(row: &rusqlite::Row) -> BirdResult<Family> {
    let id_str: String = row.get(0)?;
    Ok(Family {
        id: parse_id(&id_str)?,
        family_name: row.get(1)?,
        subfamily_name: row.get(2)?,
    })
}
