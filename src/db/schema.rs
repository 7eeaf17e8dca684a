use std::path::Path;

use rusqlite::Connection;

use crate::error::BirdResult;

/// Initialize the database schema. Creates all tables if they don't exist.
pub fn initialize(conn: &Connection) -> BirdResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS families (
            id TEXT PRIMARY KEY NOT NULL,
            family_name TEXT NOT NULL,
            subfamily_name TEXT
        );

        CREATE TABLE IF NOT EXISTS birds (
            id TEXT PRIMARY KEY NOT NULL,
            english_name TEXT NOT NULL,
            latin_name TEXT,
            french_name TEXT,
            species_status TEXT,
            family_id TEXT REFERENCES families(id)
        );

        CREATE TABLE IF NOT EXISTS locations (
            id TEXT PRIMARY KEY NOT NULL,
            location_name TEXT NOT NULL,
            parent_id TEXT REFERENCES locations(id)
        );

        CREATE TABLE IF NOT EXISTS trips (
            id TEXT PRIMARY KEY NOT NULL,
            trip_name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS sightings (
            id TEXT PRIMARY KEY NOT NULL,
            bird_id TEXT NOT NULL REFERENCES birds(id),
            location_id TEXT NOT NULL REFERENCES locations(id),
            trip_id TEXT REFERENCES trips(id) ON DELETE SET NULL,
            date_seen TEXT NOT NULL,
            heard_not_seen INTEGER NOT NULL DEFAULT 0,
            count INTEGER NOT NULL DEFAULT 1,
            notes TEXT NOT NULL DEFAULT '',
            entry_seq INTEGER NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_birds_family ON birds(family_id);
        CREATE INDEX IF NOT EXISTS idx_locations_parent ON locations(parent_id);
        CREATE INDEX IF NOT EXISTS idx_sightings_bird ON sightings(bird_id);
        CREATE INDEX IF NOT EXISTS idx_sightings_location ON sightings(location_id);
        CREATE INDEX IF NOT EXISTS idx_sightings_trip ON sightings(trip_id);
        CREATE INDEX IF NOT EXISTS idx_sightings_date ON sightings(date_seen);
        ",
    )?;
    Ok(())
}

/// Open (creating if needed) the database file at `path` and initialize it.
pub fn open(path: &Path) -> BirdResult<Connection> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let conn = Connection::open(path)?;
    initialize(&conn)?;
    Ok(conn)
}

/// Create an in-memory connection for testing.
pub fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize(&conn).unwrap();
    conn
}
