use chrono::NaiveDate;

use crate::error::{BirdError, BirdResult};

/// Trimmed `value`, or `BlankField` naming `field` when nothing is left.
pub fn non_blank(value: &str, field: &str) -> BirdResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        Err(BirdError::BlankField {
            field: field.to_string(),
        })
    } else {
        Ok(trimmed)
    }
}

/// Sighting counts and similar quantities start at 1.
pub fn positive(value: i32, field: &str) -> BirdResult<i32> {
    if value <= 0 {
        Err(BirdError::NonPositive {
            field: field.to_string(),
        })
    } else {
        Ok(value)
    }
}

/// Bulk operations need at least one selected id.
pub fn non_empty_set<T>(value: &[T], field: &str) -> BirdResult<()> {
    if value.is_empty() {
        Err(BirdError::EmptySet {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Optional text fields store `None` rather than an empty string.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Validates that `end` is not before `start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> BirdResult<()> {
    if end < start {
        Err(BirdError::InvalidDateRange)
    } else {
        Ok(())
    }
}
