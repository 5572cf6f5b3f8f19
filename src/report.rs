//! Row-oriented report tables for a single session and for a consolidation.
//!
//! Rows are plain serializable structs; the CLI writes them out as JSON.
//! Dates and times are rendered in the zone passed in, normally the system zone.

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::aggregate::{Totals, aggregate, sorted_desc};
use crate::consolidate::{ConsolidatedReport, ValueShare};
use crate::model::{Area, Sector, SessionRecord};

/// One timed activity, flattened with its session header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub observer_name: String,
    pub worker_name: String,
    pub work_order: String,
    pub sector: Sector,
    pub area: Area,
    pub text: String,
    pub value: String,
    pub nature: String,
    pub category: String,
    pub subcategory: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,

    /// Empty when the interval has no duration.
    pub duration_hms: String,
    pub duration_minutes: Option<f64>,
    pub duration_seconds: Option<u64>,

    pub start_iso: String,
    pub end_iso: String,
}

/// Time spent on one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalRow {
    pub label: String,
    pub hms: String,
    pub minutes: f64,
}

/// Per-dimension totals, each sorted by descending time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub by_value: Vec<TotalRow>,
    pub by_nature: Vec<TotalRow>,
    pub by_category: Vec<TotalRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_hms: String,
    pub count_activities: usize,
    pub started_at: String,
    pub ended_at: String,

    #[serde(flatten)]
    pub breakdown: Breakdown,
}

/// Export of one finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub activities: Vec<ActivityRow>,
    pub summary: SessionSummary,
}

/// One surviving session in a consolidation export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub observer_name: String,
    pub worker_name: String,
    pub work_order: String,
    pub sector: Sector,
    pub area: Area,
    pub total_hms: String,
    pub total_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedTotals {
    pub total_hms: String,
    pub total_minutes: f64,
    pub count_sessions: usize,
    pub count_activities: usize,
    pub composition: Vec<ValueShare>,

    #[serde(flatten)]
    pub breakdown: Breakdown,
}

/// Export of a consolidated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedExport {
    pub sessions: Vec<SessionRow>,
    pub totals: ConsolidatedTotals,
}

/// Builds the activity and summary tables for one record.
pub fn session_report(record: &SessionRecord, tz: &TimeZone) -> SessionReport {
    let header = &record.header;
    let activities = record
        .intervals
        .iter()
        .map(|interval| {
            let path = &interval.classification;
            let duration = interval.duration_ms();
            ActivityRow {
                observer_name: header.observer_name.clone(),
                worker_name: header.worker_name.clone(),
                work_order: header.work_order.clone(),
                sector: header.sector,
                area: header.area,
                text: interval.text.clone(),
                value: path.value.clone().unwrap_or_default(),
                nature: path.nature.clone().unwrap_or_default(),
                category: path.category.clone().unwrap_or_default(),
                subcategory: path.subcategory.clone().unwrap_or_default(),
                start_date: local_date(interval.start_at, tz),
                start_time: local_time(interval.start_at, tz),
                end_date: local_date(interval.end_at, tz),
                end_time: local_time(interval.end_at, tz),
                duration_hms: duration.map(hms).unwrap_or_default(),
                duration_minutes: duration.map(minutes),
                duration_seconds: duration.map(|ms| ms / 1000),
                start_iso: iso(interval.start_at),
                end_iso: iso(interval.end_at),
            }
        })
        .collect();

    let totals = aggregate(&record.intervals);
    SessionReport {
        activities,
        summary: SessionSummary {
            total_hms: hms(totals.total_ms),
            count_activities: totals.count_activities,
            started_at: iso(record.started_at),
            ended_at: iso(record.ended_at),
            breakdown: Breakdown {
                by_value: total_rows(&totals.by_value),
                by_nature: total_rows(&totals.by_nature),
                by_category: total_rows(&totals.by_category),
            },
        },
    }
}

/// Builds the per-session and totals tables for a consolidation.
pub fn consolidated_export(report: &ConsolidatedReport, tz: &TimeZone) -> ConsolidatedExport {
    let sessions = report
        .sessions
        .iter()
        .map(|session| SessionRow {
            date: local_date(session.started_at, tz),
            start_time: local_time(session.started_at, tz),
            end_time: local_time(session.ended_at, tz),
            observer_name: session.header.observer_name.clone(),
            worker_name: session.header.worker_name.clone(),
            work_order: session.header.work_order.clone(),
            sector: session.header.sector,
            area: session.header.area,
            total_hms: hms(session.total_ms),
            total_minutes: minutes(session.total_ms),
        })
        .collect();

    let totals = &report.totals;
    ConsolidatedExport {
        sessions,
        totals: ConsolidatedTotals {
            total_hms: hms(totals.total_ms),
            total_minutes: minutes(totals.total_ms),
            count_sessions: report.count_sessions,
            count_activities: totals.count_activities,
            composition: report.composition.clone(),
            breakdown: Breakdown {
                by_value: total_rows(&totals.by_value),
                by_nature: total_rows(&totals.by_nature),
                by_category: total_rows(&totals.by_category),
            },
        },
    }
}

/// `HH:MM:SS`, floored to whole seconds. Hours are not capped at 24.
pub fn hms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Minutes rounded to two decimals.
#[allow(clippy::cast_precision_loss)]
pub fn minutes(ms: u64) -> f64 {
    (ms as f64 / 60_000.0 * 100.0).round() / 100.0
}

/// `YYYY-MM-DD` in `tz`, or empty when absent.
pub fn local_date(at: Option<Timestamp>, tz: &TimeZone) -> String {
    at.map(|ts| ts.to_zoned(tz.clone()).strftime("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `HH:MM:SS` in `tz`, or empty when absent.
pub fn local_time(at: Option<Timestamp>, tz: &TimeZone) -> String {
    at.map(|ts| ts.to_zoned(tz.clone()).strftime("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn iso(at: Option<Timestamp>) -> String {
    at.map(|ts| ts.to_string()).unwrap_or_default()
}

fn total_rows(totals: &Totals) -> Vec<TotalRow> {
    sorted_desc(totals)
        .into_iter()
        .map(|(label, ms)| TotalRow {
            label: label.to_string(),
            hms: hms(ms),
            minutes: minutes(ms),
        })
        .collect()
}

/// Default file name for a single-session export.
pub fn session_file_name(record: &SessionRecord, today: Date) -> String {
    format!(
        "wrench_time_{}_{}_{today}.json",
        safe_file_name(&record.header.worker_name),
        safe_file_name(&record.header.work_order)
    )
}

/// Default file name for a consolidation export.
pub fn consolidated_file_name(today: Date) -> String {
    format!("consolidacao_wrench_time_{today}.json")
}

/// Default file name for a raw record export.
pub fn records_file_name(today: Date) -> String {
    format!("registros_wrench_time_{today}.json")
}

/// Reduces text to `[A-Za-z0-9_-]`: letters are decomposed and their combining
/// marks dropped, anything else becomes `_`, runs of `_` collapse, and edge
/// underscores are trimmed.
pub fn safe_file_name(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        let c = if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

fn is_combining_mark(c: char) -> bool {
    ('\u{300}'..='\u{36f}').contains(&c)
}
