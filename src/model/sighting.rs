use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::Id;
use super::location::Location;
use super::taxonomy::Bird;
use super::trip::Trip;

/// One observation of a species at a location on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sighting {
    pub id: Id<Sighting>,
    pub bird_id: Id<Bird>,
    pub location_id: Id<Location>,
    pub trip_id: Option<Id<Trip>>,
    pub date_seen: NaiveDate,
    pub heard_not_seen: bool,
    pub count: i32,
    pub notes: String,
}

impl Sighting {
    pub fn create(bird_id: Id<Bird>, location_id: Id<Location>, date_seen: NaiveDate) -> Self {
        Self {
            id: Id::generate(),
            bird_id,
            location_id,
            trip_id: None,
            date_seen,
            heard_not_seen: false,
            count: 1,
            notes: String::new(),
        }
    }

    fn seen_within(&self, today: NaiveDate, days: i64) -> bool {
        (today - self.date_seen).num_days() <= days
    }

    pub fn was_seen_recently(&self, today: NaiveDate) -> bool {
        self.seen_within(today, 3)
    }

    pub fn was_seen_this_month(&self, today: NaiveDate) -> bool {
        self.seen_within(today, 30)
    }

    pub fn was_seen_this_year(&self, today: NaiveDate) -> bool {
        self.seen_within(today, 365)
    }
}

/// A sighting joined with the names of what it references.
#[derive(Debug, Clone, Serialize)]
pub struct SightingDetail {
    #[serde(flatten)]
    pub sighting: Sighting,
    pub bird_name: String,
    pub latin_name: Option<String>,
    pub location_name: String,
    pub trip_name: Option<String>,
}
