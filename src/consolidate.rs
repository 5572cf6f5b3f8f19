//! Consolidation: filter session records and roll their time up into one report.

use std::fmt;
use std::str::FromStr;

use jiff::{Timestamp, ToSpan, Zoned};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregation, aggregate};
use crate::model::{Area, Sector, SessionHeader, SessionRecord};
use crate::taxonomy::VALUE_LABELS;

/// Which sessions to include by start date, relative to the current day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    /// Started at or after local midnight today.
    #[serde(rename = "today")]
    Today,

    /// Started at or after local midnight six days ago.
    #[default]
    #[serde(rename = "last-7-days")]
    Last7Days,

    /// No date restriction.
    #[serde(rename = "all")]
    All,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateRange::Today => "today",
            DateRange::Last7Days => "last-7-days",
            DateRange::All => "all",
        })
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "today" => Ok(DateRange::Today),
            "last-7-days" => Ok(DateRange::Last7Days),
            "all" => Ok(DateRange::All),
            _ => Err(format!(
                "unknown date range '{s}' (expected today, last-7-days or all)"
            )),
        }
    }
}

/// Consolidation filter. `None` means any value passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub date_range: DateRange,
    pub worker: Option<String>,
    pub area: Option<Area>,
    pub sector: Option<Sector>,
}

/// One surviving session and its own total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotal {
    pub record_id: Uuid,

    #[serde(flatten)]
    pub header: SessionHeader,

    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub total_ms: u64,
    pub count_activities: usize,
}

/// Share of total time for one Value label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueShare {
    pub label: &'static str,
    pub ms: u64,

    /// Percent with one decimal. Shares are not forced to sum to 100.
    pub pct: f64,
}

/// Aggregated time across all sessions that pass a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReport {
    pub count_sessions: usize,

    #[serde(flatten)]
    pub totals: Aggregation,

    pub sessions: Vec<SessionTotal>,
    pub composition: Vec<ValueShare>,
}

/// Filters `records` and aggregates the union of their intervals.
///
/// Date ranges are evaluated against `now` in its own time zone. Records
/// without a start time fail `Today` and `Last7Days` but pass `All`.
pub fn consolidate(
    records: &[SessionRecord],
    filter: &Filter,
    now: &Zoned,
) -> Result<ConsolidatedReport, jiff::Error> {
    let cutoff = date_cutoff(filter.date_range, now)?;
    let selected: Vec<&SessionRecord> = records
        .iter()
        .filter(|record| matches(record, filter, cutoff))
        .collect();
    log::debug!(
        "consolidating {} of {} sessions ({})",
        selected.len(),
        records.len(),
        filter.date_range
    );

    let sessions = selected
        .iter()
        .map(|record| SessionTotal {
            record_id: record.id,
            header: record.header.clone(),
            started_at: record.started_at,
            ended_at: record.ended_at,
            total_ms: record.total_ms(),
            count_activities: record.intervals.len(),
        })
        .collect();
    let totals = aggregate(selected.iter().flat_map(|record| &record.intervals));
    let composition = composition(&totals);

    Ok(ConsolidatedReport {
        count_sessions: selected.len(),
        totals,
        sessions,
        composition,
    })
}

/// Percent of total time for each of the three Value labels.
///
/// A zero total yields zero percentages rather than NaN.
#[allow(clippy::cast_precision_loss)]
pub fn composition(totals: &Aggregation) -> Vec<ValueShare> {
    let denominator = totals.total_ms.max(1) as f64;
    VALUE_LABELS
        .into_iter()
        .map(|label| {
            let ms = totals.by_value.get(label).copied().unwrap_or(0);
            let pct = (ms as f64 / denominator * 1000.0).round() / 10.0;
            ValueShare { label, ms, pct }
        })
        .collect()
}

/// Distinct worker names in first-seen order, for building a worker filter.
pub fn worker_options(records: &[SessionRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        let name = record.header.worker_name.as_str();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// The earliest start time that passes the date range, if it restricts at all.
fn date_cutoff(range: DateRange, now: &Zoned) -> Result<Option<Timestamp>, jiff::Error> {
    let midnight = now.start_of_day()?;
    let cutoff = match range {
        DateRange::All => return Ok(None),
        DateRange::Today => midnight,
        DateRange::Last7Days => midnight.checked_sub(6.days())?.start_of_day()?,
    };
    Ok(Some(cutoff.timestamp()))
}

fn matches(record: &SessionRecord, filter: &Filter, cutoff: Option<Timestamp>) -> bool {
    let date_ok = match cutoff {
        None => true,
        Some(cutoff) => record.started_at.is_some_and(|started| started >= cutoff),
    };
    let worker_ok = filter
        .worker
        .as_ref()
        .is_none_or(|worker| record.header.worker_name == *worker);
    let area_ok = filter.area.is_none_or(|area| record.header.area == area);
    let sector_ok = filter
        .sector
        .is_none_or(|sector| record.header.sector == sector);

    date_ok && worker_ok && area_ok && sector_ok
}
