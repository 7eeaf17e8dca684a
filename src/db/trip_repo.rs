use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection};

use super::{like_pattern, parse_date, parse_id};
use crate::error::BirdResult;
use crate::model::{Id, Trip};

pub fn insert(conn: &Connection, trip: &Trip) -> BirdResult<()> {
    conn.execute(
        "INSERT INTO trips (id, trip_name, start_date, end_date, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            trip.id.value.to_string(),
            trip.trip_name,
            trip.start_date.to_string(),
            trip.end_date.to_string(),
            trip.description,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, trip: &Trip) -> BirdResult<()> {
    conn.execute(
        "UPDATE trips SET trip_name = ?1, start_date = ?2, end_date = ?3, description = ?4
         WHERE id = ?5",
        params![
            trip.trip_name,
            trip.start_date.to_string(),
            trip.end_date.to_string(),
            trip.description,
            trip.id.value.to_string(),
        ],
    )?;
    Ok(())
}

/// Deletes the trip after detaching its sightings. Returns how many sightings
/// were detached.
pub fn delete(conn: &Connection, id: Id<Trip>) -> BirdResult<usize> {
    let detached = conn.execute(
        "UPDATE sightings SET trip_id = NULL WHERE trip_id = ?1",
        params![id.value.to_string()],
    )?;
    conn.execute(
        "DELETE FROM trips WHERE id = ?1",
        params![id.value.to_string()],
    )?;
    Ok(detached)
}

pub fn find_by_id(conn: &Connection, id: Id<Trip>) -> BirdResult<Option<Trip>> {
    let mut stmt = conn.prepare(
        "SELECT id, trip_name, start_date, end_date, description FROM trips WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.value.to_string()], |row| Ok(row_to_trip(row)));

    match result {
        Ok(trip) => Ok(Some(trip?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Trips ordered by start date (newest first), optionally filtered by a
/// search over name/description and by a year matching start or end date.
/// Each trip comes with its sighting count and first/last sighting dates.
pub fn find_with_stats(
    conn: &Connection,
    search: Option<&str>,
    year: Option<i32>,
) -> BirdResult<Vec<(Trip, i64, Option<NaiveDate>, Option<NaiveDate>)>> {
    let mut clauses = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(term) = search {
        args.push(like_pattern(term));
        let n = args.len();
        clauses.push(format!(
            "(LOWER(t.trip_name) LIKE ?{n} ESCAPE '\\' OR LOWER(t.description) LIKE ?{n} ESCAPE '\\')"
        ));
    }
    if let Some(y) = year {
        args.push(format!("{:04}", y));
        let n = args.len();
        clauses.push(format!(
            "(strftime('%Y', t.start_date) = ?{n} OR strftime('%Y', t.end_date) = ?{n})"
        ));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "SELECT t.id, t.trip_name, t.start_date, t.end_date, t.description,
                COUNT(s.id), MIN(s.date_seen), MAX(s.date_seen)
         FROM trips t
         LEFT JOIN sightings s ON s.trip_id = t.id
         {where_clause}
         GROUP BY t.id
         ORDER BY t.start_date DESC, t.trip_name"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            let count: i64 = row.get(5)?;
            let first: Option<String> = row.get(6)?;
            let last: Option<String> = row.get(7)?;
            Ok((row_to_trip(row), count, first, last))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(trip, count, first, last)| {
            Ok((
                trip?,
                count,
                first.as_deref().map(parse_date).transpose()?,
                last.as_deref().map(parse_date).transpose()?,
            ))
        })
        .collect()
}

/// Distinct start years, newest first.
pub fn find_start_years(conn: &Connection) -> BirdResult<Vec<i32>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT CAST(strftime('%Y', start_date) AS INTEGER) AS y
         FROM trips ORDER BY y DESC",
    )?;

    let years = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;

    Ok(years)
}

fn row_to_trip(row: &rusqlite::Row) -> BirdResult<Trip> {
    let id_str: String = row.get(0)?;
    let start: String = row.get(2)?;
    let end: String = row.get(3)?;
    Ok(Trip {
        id: parse_id(&id_str)?,
        trip_name: row.get(1)?,
        start_date: parse_date(&start)?,
        end_date: parse_date(&end)?,
        description: row.get(4)?,
    })
}
