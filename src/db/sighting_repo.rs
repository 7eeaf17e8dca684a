use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection};

use super::location_repo::subtree_cte;
use super::{parse_date, parse_id, parse_optional_id};
use crate::error::BirdResult;
use crate::model::{Bird, Id, Location, Sighting, SightingDetail, Trip};

/// Restricts which sightings a query returns. Unset fields don't filter.
#[derive(Debug, Clone, Default)]
pub struct SightingFilter {
    pub bird_id: Option<Id<Bird>>,
    /// Sightings at exactly this location.
    pub location_id: Option<Id<Location>>,
    /// Sightings at this location or any location beneath it.
    pub location_subtree: Option<Id<Location>>,
    pub trip_id: Option<Id<Trip>>,
    /// Inclusive lower bound on `date_seen`.
    pub from: Option<NaiveDate>,
    /// Exclusive upper bound on `date_seen`.
    pub until: Option<NaiveDate>,
    pub on: Option<NaiveDate>,
}

impl SightingFilter {
    pub fn between(from: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self {
            from,
            until,
            ..Self::default()
        }
    }

    /// Builds the optional CTE prefix, the WHERE clause and its arguments.
    fn to_sql(&self) -> (String, String, Vec<String>) {
        let mut args: Vec<String> = Vec::new();
        let mut clauses = Vec::new();
        let mut cte = String::new();

        if let Some(root) = self.location_subtree {
            args.push(root.value.to_string());
            cte = format!("WITH RECURSIVE {} ", subtree_cte(args.len()));
            clauses.push("s.location_id IN (SELECT id FROM subtree)".to_string());
        }
        if let Some(bird) = self.bird_id {
            args.push(bird.value.to_string());
            clauses.push(format!("s.bird_id = ?{}", args.len()));
        }
        if let Some(location) = self.location_id {
            args.push(location.value.to_string());
            clauses.push(format!("s.location_id = ?{}", args.len()));
        }
        if let Some(trip) = self.trip_id {
            args.push(trip.value.to_string());
            clauses.push(format!("s.trip_id = ?{}", args.len()));
        }
        if let Some(from) = self.from {
            args.push(from.to_string());
            clauses.push(format!("s.date_seen >= ?{}", args.len()));
        }
        if let Some(until) = self.until {
            args.push(until.to_string());
            clauses.push(format!("s.date_seen < ?{}", args.len()));
        }
        if let Some(on) = self.on {
            args.push(on.to_string());
            clauses.push(format!("s.date_seen = ?{}", args.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        (cte, where_clause, args)
    }
}

/// Result ordering for sighting queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SightingOrder {
    /// Most recent date first, then most recently entered.
    #[default]
    Recent,
    /// Most recently entered first.
    Entered,
    /// Most recent date first, then by bird name.
    RecentByBird,
}

impl SightingOrder {
    fn to_sql(self) -> &'static str {
        match self {
            SightingOrder::Recent => "s.date_seen DESC, s.entry_seq DESC",
            SightingOrder::Entered => "s.entry_seq DESC",
            SightingOrder::RecentByBird => "s.date_seen DESC, b.english_name, s.entry_seq",
        }
    }
}

pub fn insert(conn: &Connection, sighting: &Sighting) -> BirdResult<()> {
    conn.execute(
        "INSERT INTO sightings
             (id, bird_id, location_id, trip_id, date_seen, heard_not_seen, count, notes, entry_seq)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                 (SELECT COALESCE(MAX(entry_seq), 0) + 1 FROM sightings))",
        params![
            sighting.id.value.to_string(),
            sighting.bird_id.value.to_string(),
            sighting.location_id.value.to_string(),
            sighting.trip_id.map(|t| t.value.to_string()),
            sighting.date_seen.to_string(),
            sighting.heard_not_seen as i32,
            sighting.count,
            sighting.notes,
        ],
    )?;
    Ok(())
}

pub fn update(conn: &Connection, sighting: &Sighting) -> BirdResult<()> {
    conn.execute(
        "UPDATE sightings SET bird_id = ?1, location_id = ?2, trip_id = ?3, date_seen = ?4,
         heard_not_seen = ?5, count = ?6, notes = ?7 WHERE id = ?8",
        params![
            sighting.bird_id.value.to_string(),
            sighting.location_id.value.to_string(),
            sighting.trip_id.map(|t| t.value.to_string()),
            sighting.date_seen.to_string(),
            sighting.heard_not_seen as i32,
            sighting.count,
            sighting.notes,
            sighting.id.value.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Id<Sighting>) -> BirdResult<()> {
    conn.execute(
        "DELETE FROM sightings WHERE id = ?1",
        params![id.value.to_string()],
    )?;
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: Id<Sighting>) -> BirdResult<Option<SightingDetail>> {
    let mut stmt = conn.prepare(&format!("{} WHERE s.id = ?1", select_detail()))?;

    let result = stmt.query_row(params![id.value.to_string()], |row| Ok(row_to_detail(row)));

    match result {
        Ok(detail) => Ok(Some(detail?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Sightings matching `filter`, joined with bird/location/trip names.
pub fn find(
    conn: &Connection,
    filter: &SightingFilter,
    order: SightingOrder,
) -> BirdResult<Vec<SightingDetail>> {
    let (cte, where_clause, args) = filter.to_sql();
    let sql = format!(
        "{cte}{} {where_clause} ORDER BY {}",
        select_detail(),
        order.to_sql()
    );

    let mut stmt = conn.prepare(&sql)?;
    let sightings = stmt
        .query_map(params_from_iter(args.iter()), |row| Ok(row_to_detail(row)))?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .collect::<BirdResult<Vec<_>>>()?;

    Ok(sightings)
}

pub fn count(conn: &Connection, filter: &SightingFilter) -> BirdResult<i64> {
    let (cte, where_clause, args) = filter.to_sql();
    let sql = format!("{cte}SELECT COUNT(*) FROM sightings s {where_clause}");
    let count: i64 = conn.query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
    Ok(count)
}

/// Distinct species among the sightings matching `filter`.
pub fn distinct_bird_ids(conn: &Connection, filter: &SightingFilter) -> BirdResult<HashSet<Id<Bird>>> {
    let (cte, where_clause, args) = filter.to_sql();
    let sql = format!("{cte}SELECT DISTINCT s.bird_id FROM sightings s {where_clause}");

    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?
        .iter()
        .map(|s| parse_id(s))
        .collect::<BirdResult<HashSet<_>>>()?;

    Ok(ids)
}

pub fn count_distinct_birds(conn: &Connection, filter: &SightingFilter) -> BirdResult<i64> {
    let (cte, where_clause, args) = filter.to_sql();
    let sql = format!("{cte}SELECT COUNT(DISTINCT s.bird_id) FROM sightings s {where_clause}");
    let count: i64 = conn.query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
    Ok(count)
}

/// Earliest date each species was ever seen.
pub fn first_seen_dates(conn: &Connection) -> BirdResult<Vec<(Id<Bird>, NaiveDate)>> {
    let mut stmt = conn.prepare(
        "SELECT bird_id, MIN(date_seen) FROM sightings GROUP BY bird_id",
    )?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    rows.iter()
        .map(|(bird, date)| Ok((parse_id(bird)?, parse_date(date)?)))
        .collect()
}

/// (year, sightings, distinct species), newest year first.
pub fn year_counts(conn: &Connection) -> BirdResult<Vec<(i32, i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%Y', date_seen) AS INTEGER) AS y, COUNT(*), COUNT(DISTINCT bird_id)
         FROM sightings GROUP BY y ORDER BY y DESC",
    )?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// (year, month, sightings, distinct species), newest month first.
pub fn month_counts(conn: &Connection) -> BirdResult<Vec<(i32, u32, i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%Y', date_seen) AS INTEGER) AS y,
                CAST(strftime('%m', date_seen) AS INTEGER) AS m,
                COUNT(*), COUNT(DISTINCT bird_id)
         FROM sightings GROUP BY y, m ORDER BY y DESC, m DESC",
    )?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn select_detail() -> &'static str {
    "SELECT s.id, s.bird_id, s.location_id, s.trip_id, s.date_seen, s.heard_not_seen, s.count,
            s.notes, b.english_name, b.latin_name, l.location_name, t.trip_name
     FROM sightings s
     JOIN birds b ON b.id = s.bird_id
     JOIN locations l ON l.id = s.location_id
     LEFT JOIN trips t ON t.id = s.trip_id"
}

fn row_to_detail(row: &rusqlite::Row) -> BirdResult<SightingDetail> {
    let id_str: String = row.get(0)?;
    let bird_str: String = row.get(1)?;
    let location_str: String = row.get(2)?;
    let trip_str: Option<String> = row.get(3)?;
    let date_str: String = row.get(4)?;

    Ok(SightingDetail {
        sighting: Sighting {
            id: parse_id(&id_str)?,
            bird_id: parse_id(&bird_str)?,
            location_id: parse_id(&location_str)?,
            trip_id: parse_optional_id(trip_str)?,
            date_seen: parse_date(&date_str)?,
            heard_not_seen: row.get::<_, i32>(5)? != 0,
            count: row.get(6)?,
            notes: row.get(7)?,
        },
        bird_name: row.get(8)?,
        latin_name: row.get(9)?,
        location_name: row.get(10)?,
        trip_name: row.get(11)?,
    })
}
