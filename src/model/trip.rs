use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::Id;

/// A birding trip spanning one or more days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Id<Trip>,
    pub trip_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
}

impl Trip {
    pub fn create(trip_name: String, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Id::generate(),
            trip_name,
            start_date,
            end_date,
            description: String::new(),
        }
    }

    /// Length of the trip in days, counting both ends.
    pub fn duration(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
