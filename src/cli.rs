//! CLI interface for wrench time studies.
//!
//! With no subcommand, `wrench-time` opens the interactive shell where the
//! observer starts a session, classifies and times activities, and exports
//! the results. Two non-interactive subcommands sit beside it:
//!
//! - `wrench-time taxonomy` — browse the classification tree.
//! - `wrench-time report --input <file>` — consolidate an exported record file.

mod format;
mod report;
mod shell;
mod taxonomy;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::consolidate::DateRange;
use crate::model::{Area, Sector};
use crate::observer::resolve_observer;

/// Wrench time — time-and-motion studies of maintenance work.
#[derive(Debug, Parser)]
#[command(name = "wrench-time", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Observer name offered when a session starts.
    /// Falls back to `WRENCH_TIME_OBSERVER`, then `default-observer` in config.
    #[arg(long, global = true)]
    observer: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

const WORKFLOW_HELP: &str = r#"Workflow: one observation
  1. wrench-time --observer "Klezio"
  2. > start                       (answer the prompts)
  3. > value 1                     (pick by number or by label)
     > nature Execução direta da atividade
     > next Trocar rolamento do motor
  4. > finish
  5. > export records medicoes.json

Later:
  wrench-time report --input medicoes.json --date-range all --area eletrica"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive observation shell (the default).
    Shell,

    /// List classification options under a prefix, one per line.
    ///
    /// With no flags, lists the Value labels.
    Taxonomy {
        /// Chosen Value.
        #[arg(long)]
        value: Option<String>,

        /// Chosen Nature. Requires `--value`.
        #[arg(long)]
        nature: Option<String>,

        /// Chosen Category. Requires `--nature`.
        #[arg(long)]
        category: Option<String>,
    },

    /// Consolidate an exported record file.
    ///
    /// The report JSON is written to `--out` (if given) or stdout.
    Report {
        /// Record file written by `export records`.
        #[arg(long)]
        input: PathBuf,

        /// Start-date window. Defaults to `default-date-range` from config.
        #[arg(long, value_enum)]
        date_range: Option<DateRangeArg>,

        /// Only this worker (exact name).
        #[arg(long)]
        worker: Option<String>,

        /// Only this area (MECÂNICA or ELÉTRICA).
        #[arg(long)]
        area: Option<Area>,

        /// Only this sector (PREDIAL, RECEBIMENTO or TORRE).
        #[arg(long)]
        sector: Option<Sector>,

        /// Write the report JSON to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// CLI-facing date range, mapped to the domain `DateRange`.
#[derive(Debug, Clone, ValueEnum)]
pub enum DateRangeArg {
    /// Since local midnight.
    Today,
    /// Since local midnight six days ago.
    #[value(name = "last-7-days")]
    Last7Days,
    /// No date restriction.
    All,
}

impl DateRangeArg {
    fn to_domain(&self) -> DateRange {
        match self {
            Self::Today => DateRange::Today,
            Self::Last7Days => DateRange::Last7Days,
            Self::All => DateRange::All,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let observer = resolve_observer(cli.observer.as_deref(), config);
            shell::run(config, observer)
        }
        Command::Taxonomy {
            value,
            nature,
            category,
        } => taxonomy::cmd_taxonomy(value.as_deref(), nature.as_deref(), category.as_deref()),
        Command::Report {
            input,
            date_range,
            worker,
            area,
            sector,
            out,
        } => {
            let date_range = date_range
                .as_ref()
                .map_or(config.default_date_range, DateRangeArg::to_domain);
            report::cmd_report(&report::ReportArgs {
                input,
                date_range,
                worker,
                area,
                sector,
                out,
            })
        }
    }
}
