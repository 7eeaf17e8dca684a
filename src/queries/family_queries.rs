use rusqlite::Connection;
use serde::Serialize;

use crate::db::family_repo;
use crate::error::BirdResult;
use crate::model::Family;

#[derive(Debug, Clone, Serialize)]
pub struct FamilyRow {
    #[serde(flatten)]
    pub family: Family,
    pub display_name: String,
    pub bird_count: i64,
}

pub fn list_with_counts(conn: &Connection) -> BirdResult<Vec<FamilyRow>> {
    Ok(family_repo::find_all_with_bird_counts(conn)?
        .into_iter()
        .map(|(family, bird_count)| FamilyRow {
            display_name: family.display_name(),
            family,
            bird_count,
        })
        .collect())
}
