//! Output formatting for shell display.

use std::fmt::Write;

use jiff::Timestamp;
use jiff::tz::TimeZone;

use crate::aggregate::{Totals, sorted_desc};
use crate::consolidate::{ConsolidatedReport, Filter};
use crate::model::{ActivityInterval, SessionRecord};
use crate::report::{hms, local_date, local_time};
use crate::taxonomy::Level;

/// Numbered option list for one taxonomy level.
pub(super) fn format_options(level: Level, options: &[&str]) -> String {
    let mut out = format!("{level}:");
    for (i, option) in options.iter().enumerate() {
        let _ = write!(out, "\n  {}. {option}", i + 1);
    }
    out
}

/// One line per interval; an open interval shows time elapsed up to `now`.
pub(super) fn format_intervals(
    intervals: &[ActivityInterval],
    now: Timestamp,
    tz: &TimeZone,
) -> String {
    let mut out = String::new();
    for (i, interval) in intervals.iter().enumerate() {
        let (duration, marker) = if interval.is_open() {
            let running = ActivityInterval {
                end_at: Some(now),
                ..interval.clone()
            };
            (running.elapsed_ms(), "  (running)")
        } else {
            (interval.elapsed_ms(), "")
        };
        let _ = writeln!(
            out,
            "{:>3}. {}  {}  {}  [{}]{marker}",
            i + 1,
            local_time(interval.start_at, tz),
            hms(duration),
            interval.text,
            interval.classification.display(),
        );
    }
    out
}

/// One-line listing entry for a stored record.
pub(super) fn format_record_line(position: usize, record: &SessionRecord, tz: &TimeZone) -> String {
    let header = &record.header;
    format!(
        "{position:>3}. {}  {} {}  {}  OS {}  {}/{}  {}  ({} activities)",
        record.short_id(),
        local_date(record.started_at, tz),
        local_time(record.started_at, tz),
        header.worker_name,
        header.work_order,
        header.sector,
        header.area,
        hms(record.total_ms()),
        record.intervals.len(),
    )
}

pub(super) fn format_filter(filter: &Filter) -> String {
    format!(
        "date {}, worker {}, area {}, sector {}",
        filter.date_range,
        filter.worker.as_deref().unwrap_or("ANY"),
        filter.area.map_or("ANY", |a| a.label()),
        filter.sector.map_or("ANY", |s| s.label()),
    )
}

/// Human-readable consolidation summary.
pub(super) fn format_consolidation(report: &ConsolidatedReport) -> String {
    let totals = &report.totals;
    let mut out = format!(
        "{} sessions, {} activities, {} measured\n",
        report.count_sessions,
        totals.count_activities,
        hms(totals.total_ms),
    );
    out.push_str("\nComposition:\n");
    for share in &report.composition {
        let _ = writeln!(out, "  {:<20} {:>5.1}%  {}", share.label, share.pct, hms(share.ms));
    }
    for (title, dimension) in [
        ("By value", &totals.by_value),
        ("By nature", &totals.by_nature),
        ("By category", &totals.by_category),
    ] {
        let _ = write!(out, "\n{title}:\n{}", format_totals(dimension));
    }
    out
}

fn format_totals(totals: &Totals) -> String {
    let mut out = String::new();
    for (label, ms) in sorted_desc(totals) {
        let _ = writeln!(out, "  {}  {label}", hms(ms));
    }
    out
}
