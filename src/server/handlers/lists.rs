use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::int_param;
use crate::pagination::{self, OutOfRange, Page, PageSize, DEFAULT_PAGE_SIZE, LIFELIST_PAGE_SIZES};
use crate::queries::list_queries::{self, ListEntry, PeriodStats, YearMonths, YearSummary};
use crate::queries::Period;
use crate::server::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    year: Option<String>,
    month: Option<String>,
    page: Option<String>,
    page_size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LifeList {
    total_species: usize,
    #[serde(flatten)]
    page: Page<ListEntry>,
}

#[derive(Debug, Serialize)]
pub struct YearList {
    period: Period,
    title: String,
    /// Present when a specific year was selected.
    stats: Option<PeriodStats>,
    years: Vec<YearSummary>,
    total_species: usize,
    #[serde(flatten)]
    page: Page<ListEntry>,
}

#[derive(Debug, Serialize)]
pub struct MonthList {
    period: Period,
    title: String,
    /// Present when a specific month was selected.
    stats: Option<PeriodStats>,
    months: Vec<YearMonths>,
    total_species: usize,
    #[serde(flatten)]
    page: Page<ListEntry>,
}

pub async fn life_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<LifeList>> {
    let size = PageSize::parse_choice(
        params.page_size.as_deref(),
        &LIFELIST_PAGE_SIZES,
        DEFAULT_PAGE_SIZE,
    );

    let entries = state.run(list_queries::life_list).await?;
    let total_species = entries.len();

    Ok(Json(LifeList {
        total_species,
        page: pagination::paginate(entries, params.page.as_deref(), size),
    }))
}

pub async fn year_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<YearList>> {
    let period = match int_param::<i32>(params.year.as_deref()) {
        Some(year) => Period::year(year),
        None => Period::AllTime,
    };
    let size = PageSize::parse_lenient(params.page_size.as_deref(), DEFAULT_PAGE_SIZE);

    let (entries, stats, years) = state
        .run(move |conn| {
            let stats = match period {
                Period::AllTime => None,
                _ => Some(list_queries::period_stats(conn, period)?),
            };
            Ok((
                list_queries::period_list(conn, period)?,
                stats,
                list_queries::year_summaries(conn)?,
            ))
        })
        .await?;

    Ok(Json(YearList {
        title: period.label(),
        period,
        stats,
        years,
        total_species: entries.len(),
        page: pagination::paginate_with(entries, params.page.as_deref(), size, OutOfRange::First),
    }))
}

/// A month needs both year and month; a year alone selects the whole year.
fn month_period(params: &ListParams) -> Period {
    let year = int_param::<i32>(params.year.as_deref());
    let month = params.month.as_deref().filter(|m| !m.trim().is_empty());

    match (year, month) {
        (Some(y), Some(m)) => match int_param::<u32>(Some(m)) {
            Some(m) => Period::month(y, m),
            None => Period::AllTime,
        },
        (Some(y), None) => Period::year(y),
        (None, _) => Period::AllTime,
    }
}

pub async fn month_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<MonthList>> {
    let period = month_period(&params);
    let size = PageSize::parse_lenient(params.page_size.as_deref(), DEFAULT_PAGE_SIZE);

    let (entries, stats, months) = state
        .run(move |conn| {
            let stats = match period {
                Period::Month { .. } => Some(list_queries::period_stats(conn, period)?),
                _ => None,
            };
            Ok((
                list_queries::period_list(conn, period)?,
                stats,
                list_queries::month_summaries(conn)?,
            ))
        })
        .await?;

    Ok(Json(MonthList {
        title: period.label(),
        period,
        stats,
        months,
        total_species: entries.len(),
        page: pagination::paginate_with(entries, params.page.as_deref(), size, OutOfRange::First),
    }))
}

pub async fn month_list_year_redirect(Path(year): Path<String>) -> Redirect {
    match int_param::<i32>(Some(&year)) {
        Some(y) => Redirect::permanent(&format!("/monthlist?year={y}")),
        None => Redirect::permanent("/monthlist"),
    }
}

pub async fn month_list_redirect(Path((year, month)): Path<(String, String)>) -> Redirect {
    match (int_param::<i32>(Some(&year)), int_param::<u32>(Some(&month))) {
        (Some(y), Some(m)) => Redirect::permanent(&format!("/monthlist?year={y}&month={m}")),
        (Some(y), None) => Redirect::permanent(&format!("/monthlist?year={y}")),
        _ => Redirect::permanent("/monthlist"),
    }
}
