use std::io::Write;

use birdlog::db::*;
use birdlog::import::{self, Checklist, ImportStats};
use birdlog::queries::location_queries;

fn setup() -> rusqlite::Connection {
    schema::test_connection()
}

fn checklist(json: &str) -> Checklist {
    serde_json::from_str(json).unwrap()
}

const CHECKLIST: &str = r#"{
    "families": [
        {
            "family_name": "Turdidae",
            "birds": [
                { "english_name": "Blackbird", "latin_name": "Turdus merula" },
                { "english_name": "Song Thrush", "latin_name": "Turdus philomelos" }
            ]
        },
        { "family_name": "Anatidae", "subfamily_name": "Anserinae", "birds": [] }
    ],
    "birds": [ { "english_name": "Mystery Warbler" } ],
    "locations": [
        {
            "location_name": "UK",
            "children": [
                { "location_name": "Norfolk", "children": [ { "location_name": "Cley Marshes" } ] }
            ]
        }
    ]
}"#;

#[test]
fn import_creates_taxonomy_and_locations() {
    let conn = setup();
    let stats = import::import_checklist(&conn, &checklist(CHECKLIST)).unwrap();

    assert_eq!(
        stats,
        ImportStats {
            families: 2,
            birds: 3,
            locations: 3,
            reused: 0,
        }
    );

    let blackbird = bird_repo::find_by_english_name(&conn, "blackbird").unwrap().unwrap();
    let family = family_repo::find_by_id(&conn, blackbird.family_id.unwrap()).unwrap().unwrap();
    assert_eq!(family.family_name, "Turdidae");

    let warbler = bird_repo::find_by_english_name(&conn, "Mystery Warbler").unwrap().unwrap();
    assert!(warbler.family_id.is_none());

    let results = location_queries::search(&conn, "cley").unwrap();
    assert_eq!(results[0].full_path, "UK > Norfolk > Cley Marshes");
}

#[test]
fn import_twice_reuses_existing_entries() {
    let conn = setup();
    import::import_checklist(&conn, &checklist(CHECKLIST)).unwrap();
    let again = import::import_checklist(&conn, &checklist(CHECKLIST)).unwrap();

    assert_eq!(again.families, 0);
    assert_eq!(again.birds, 0);
    assert_eq!(again.locations, 0);
    assert_eq!(again.reused, 8);
    assert_eq!(bird_repo::find_all(&conn).unwrap().len(), 3);
}

#[test]
fn import_is_rolled_back_on_invalid_entry() {
    let conn = setup();
    let bad = checklist(
        r#"{ "birds": [ { "english_name": "Robin" }, { "english_name": "   " } ] }"#,
    );

    assert!(import::import_checklist(&conn, &bad).is_err());
    assert!(bird_repo::find_all(&conn).unwrap().is_empty());
}

#[test]
fn import_file_reads_json() {
    let conn = setup();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CHECKLIST.as_bytes()).unwrap();

    let stats = import::import_file(&conn, file.path()).unwrap();
    assert_eq!(stats.birds, 3);
}

#[test]
fn import_file_rejects_malformed_json() {
    let conn = setup();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();

    assert!(import::import_file(&conn, file.path()).is_err());
}
