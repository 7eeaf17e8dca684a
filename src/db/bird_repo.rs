use rusqlite::{params, params_from_iter, Connection};

use super::{like_pattern, parse_id, parse_optional_id};
use crate::error::BirdResult;
use crate::model::{Bird, Family, Id};

const BIRD_COLUMNS: &str =
    "b.id, b.english_name, b.latin_name, b.french_name, b.species_status, b.family_id";

pub fn insert(conn: &Connection, bird: &Bird) -> BirdResult<()> {
    conn.execute(
        "INSERT INTO birds (id, english_name, latin_name, french_name, species_status, family_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            bird.id.value.to_string(),
            bird.english_name,
            bird.latin_name,
            bird.french_name,
            bird.species_status,
            bird.family_id.map(|f| f.value.to_string()),
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, bird: &Bird) -> BirdResult<()> {
    conn.execute(
        "UPDATE birds SET english_name = ?1, latin_name = ?2, french_name = ?3,
         species_status = ?4, family_id = ?5 WHERE id = ?6",
        params![
            bird.english_name,
            bird.latin_name,
            bird.french_name,
            bird.species_status,
            bird.family_id.map(|f| f.value.to_string()),
            bird.id.value.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Bird>) -> BirdResult<()> {
    conn.execute(
        "DELETE FROM birds WHERE id = ?1",
        params![id.value.to_string()],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Bird>) -> BirdResult<Option<Bird>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BIRD_COLUMNS} FROM birds b WHERE b.id = ?1"
    ))?;

    let result = stmt.query_row(params![id.value.to_string()], |row| Ok(row_to_bird(row)));

    match result {
        Ok(bird) => Ok(Some(bird?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_all(conn: &Connection) -> BirdResult<Vec<Bird>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BIRD_COLUMNS} FROM birds b ORDER BY b.english_name"
    ))?;

    let birds = stmt
        .query_map([], |row| Ok(row_to_bird(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(birds)
}

pub fn find_by_family(conn: &Connection, family_id: Id<Family>) -> BirdResult<Vec<Bird>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BIRD_COLUMNS} FROM birds b WHERE b.family_id = ?1 ORDER BY b.english_name"
    ))?;

    let birds = stmt
        .query_map(params![family_id.value.to_string()], |row| Ok(row_to_bird(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(birds)
}

/// Exact English-name lookup, ignoring case.
pub fn find_by_english_name(conn: &Connection, name: &str) -> BirdResult<Option<Bird>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BIRD_COLUMNS} FROM birds b WHERE LOWER(b.english_name) = LOWER(?1)
         ORDER BY b.english_name LIMIT 1"
    ))?;

    let result = stmt.query_row(params![name], |row| Ok(row_to_bird(row)));

    match result {
        Ok(bird) => Ok(Some(bird?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Substring match on the English name, ordered by name.
pub fn search_by_english_name(conn: &Connection, query: &str, limit: usize) -> BirdResult<Vec<Bird>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BIRD_COLUMNS} FROM birds b WHERE LOWER(b.english_name) LIKE ?1 ESCAPE '\\'
         ORDER BY b.english_name LIMIT ?2"
    ))?;

    let birds = stmt
        .query_map(params![like_pattern(query), limit as i64], |row| Ok(row_to_bird(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(birds)
}

/// Birds matching an optional name search (English, Latin or French) and an
/// optional family, each with its family name and sighting count.
pub fn find_with_counts(
    conn: &Connection,
    search: Option<&str>,
    family_id: Option<Id<Family>>,
) -> BirdResult<Vec<(Bird, Option<String>, i64)>> {
    let mut clauses = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(term) = search {
        args.push(like_pattern(term));
        let n = args.len();
        clauses.push(format!(
            "(LOWER(b.english_name) LIKE ?{n} ESCAPE '\\'
              OR LOWER(COALESCE(b.latin_name, '')) LIKE ?{n} ESCAPE '\\'
              OR LOWER(COALESCE(b.french_name, '')) LIKE ?{n} ESCAPE '\\')"
        ));
    }
    if let Some(fid) = family_id {
        args.push(fid.value.to_string());
        clauses.push(format!("b.family_id = ?{}", args.len()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT {BIRD_COLUMNS}, f.family_name, COUNT(s.id)
         FROM birds b
         LEFT JOIN families f ON f.id = b.family_id
         LEFT JOIN sightings s ON s.bird_id = b.id
         {where_clause}
         GROUP BY b.id
         ORDER BY b.english_name"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            let family_name: Option<String> = row.get(6)?;
            let count: i64 = row.get(7)?;
            Ok((row_to_bird(row), family_name, count))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(bird, family_name, count)| Ok((bird?, family_name, count)))
        .collect()
}

pub fn count_sightings(conn: &Connection, id: Id<Bird>) -> BirdResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sightings WHERE bird_id = ?1",
        params![id.value.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn row_to_bird(row: &rusqlite::Row) -> BirdResult<Bird> {
    let id_str: String = row.get(0)?;
    let family_str: Option<String> = row.get(5)?;
    Ok(Bird {
        id: parse_id(&id_str)?,
        english_name: row.get(1)?,
        latin_name: row.get(2)?,
        french_name: row.get(3)?,
        species_status: row.get(4)?,
        family_id: parse_optional_id(family_str)?,
    })
}
