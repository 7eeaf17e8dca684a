pub mod schema;
pub mod family_repo;
pub mod bird_repo;
pub mod location_repo;
pub mod trip_repo;
pub mod sighting_repo;

use chrono::NaiveDate;

use crate::error::{BirdError, BirdResult};
use crate::model::Id;

pub(crate) fn parse_id<T>(s: &str) -> BirdResult<Id<T>> {
    Id::parse(s).map_err(|e| BirdError::Other(format!("Invalid UUID: {}", e)))
}

pub(crate) fn parse_optional_id<T>(s: Option<String>) -> BirdResult<Option<Id<T>>> {
    s.as_deref().map(parse_id).transpose()
}

pub(crate) fn parse_date(s: &str) -> BirdResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| BirdError::Other(format!("Invalid date: {}", e)))
}

/// `%term%` for case-insensitive LIKE matching against LOWER(column), with
/// `\`, `%` and `_` in `term` matched literally. Pair with `ESCAPE '\'`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
