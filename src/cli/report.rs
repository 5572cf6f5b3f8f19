//! Consolidation of an exported record file.

use std::path::PathBuf;

use jiff::Zoned;
use jiff::tz::TimeZone;

use crate::consolidate::{DateRange, Filter, consolidate};
use crate::model::{Area, Sector};
use crate::report::consolidated_export;
use crate::store::{RecordStore, write_json};

pub(super) struct ReportArgs {
    pub input: PathBuf,
    pub date_range: DateRange,
    pub worker: Option<String>,
    pub area: Option<Area>,
    pub sector: Option<Sector>,
    pub out: Option<PathBuf>,
}

pub(super) fn cmd_report(args: &ReportArgs) -> Result<(), String> {
    let store = RecordStore::import_json(&args.input)
        .map_err(|e| format!("failed to read {}: {e}", args.input.display()))?;

    let filter = Filter {
        date_range: args.date_range,
        worker: args.worker.clone(),
        area: args.area,
        sector: args.sector,
    };
    let report = consolidate(store.list(), &filter, &Zoned::now())
        .map_err(|e| format!("failed to consolidate: {e}"))?;
    let export = consolidated_export(&report, &TimeZone::system());

    match &args.out {
        Some(path) => {
            write_json(path, &export)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            log::info!("consolidated report written to {}", path.display());
            eprintln!(
                "Consolidated {} of {} sessions → {}",
                report.count_sessions,
                store.len(),
                path.display()
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&export)
                .map_err(|e| format!("failed to serialize report: {e}"))?;
            println!("{json}");
        }
    }

    Ok(())
}
