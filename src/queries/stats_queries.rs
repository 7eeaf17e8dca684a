use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use super::list_queries;
use super::period::Period;
use crate::db::sighting_repo::{self, SightingFilter, SightingOrder};
use crate::error::BirdResult;
use crate::model::SightingDetail;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub life_list_count: i64,
    pub this_year: PeriodCount,
    pub last_year: PeriodCount,
    pub this_month: PeriodCount,
    pub last_month: PeriodCount,
    /// Most recently entered first.
    pub todays_sightings: Vec<SightingDetail>,
}

/// Distinct species seen in a labelled period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodCount {
    pub label: String,
    pub species: i64,
}

fn species_in(conn: &Connection, period: Period) -> BirdResult<PeriodCount> {
    Ok(PeriodCount {
        label: period.label(),
        species: sighting_repo::count_distinct_birds(conn, &period.filter())?,
    })
}

pub fn dashboard(conn: &Connection, today: NaiveDate) -> BirdResult<Dashboard> {
    let (year, month) = Period::containing(today);

    let todays = SightingFilter {
        on: Some(today),
        ..SightingFilter::default()
    };

    let dashboard = Dashboard {
        today,
        life_list_count: list_queries::total_species(conn)?,
        this_year: species_in(conn, year)?,
        last_year: species_in(conn, year.previous())?,
        this_month: species_in(conn, month)?,
        last_month: species_in(conn, month.previous())?,
        todays_sightings: sighting_repo::find(conn, &todays, SightingOrder::Entered)?,
    };

    debug!(life_list = dashboard.life_list_count, "dashboard computed");
    Ok(dashboard)
}
