//! Interactive observation shell.
//!
//! One command per line. Labels and activity text take the rest of the line,
//! so they may contain spaces. Classification levels can also be picked by
//! the number shown in `options`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;

use crate::aggregate::{aggregate, sorted_desc};
use crate::app::{App, AppError};
use crate::config::Config;
use crate::consolidate::{DateRange, Filter, worker_options};
use crate::model::{Area, Sector, SessionError, SessionHeader};
use crate::report::{
    consolidated_export, consolidated_file_name, hms, local_time, records_file_name,
    session_file_name, session_report,
};
use crate::store::{StoreError, write_json};
use crate::taxonomy::{ClassificationError, Level};

use super::format::{
    format_consolidation, format_filter, format_intervals, format_options, format_record_line,
};

const HELP: &str = "\
Session:
  start                      start observing (prompts for the header)
  options                    show the choices for the next classification level
  value|nature|category|subcategory <label or number>
  clear                      clear the classification being built
  next <text>                close the running activity and start this one
  status                     show the session in progress
  finish                     end the session and record it

Records:
  history                    list recorded sessions
  show <ref>                 show one session (id, id prefix or position)
  filter date <today|last-7-days|all>
  filter worker|area|sector <value|ANY>
  consolidate                consolidate recorded sessions with the filter
  export session <ref> [path]
  export report [path]
  export records [path]

  help, quit";

#[derive(Debug, thiserror::Error)]
enum ShellError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    Date,
    Worker,
    Area,
    Sector,
}

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Empty,
    Start,
    Options,
    Choose(Level, String),
    Clear,
    Next(String),
    Status,
    Finish,
    History,
    Show(String),
    Filter(FilterField, String),
    Consolidate,
    ExportSession {
        reference: String,
        path: Option<PathBuf>,
    },
    ExportReport(Option<PathBuf>),
    ExportRecords(Option<PathBuf>),
    Help,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let (word, rest) = split_word(line);
        let command = match word.to_lowercase().as_str() {
            "" => Self::Empty,
            "start" => Self::Start,
            "options" => Self::Options,
            "value" => Self::Choose(Level::Value, required(rest, "value <label or number>")?),
            "nature" => Self::Choose(Level::Nature, required(rest, "nature <label or number>")?),
            "category" => Self::Choose(
                Level::Category,
                required(rest, "category <label or number>")?,
            ),
            "subcategory" => Self::Choose(
                Level::Subcategory,
                required(rest, "subcategory <label or number>")?,
            ),
            "clear" => Self::Clear,
            "next" => Self::Next(required(rest, "next <activity text>")?),
            "status" => Self::Status,
            "finish" => Self::Finish,
            "history" => Self::History,
            "show" => Self::Show(required(rest, "show <ref>")?),
            "filter" => {
                let (field, value) = split_word(rest);
                let field = match field.to_lowercase().as_str() {
                    "date" => FilterField::Date,
                    "worker" => FilterField::Worker,
                    "area" => FilterField::Area,
                    "sector" => FilterField::Sector,
                    _ => return Err("usage: filter date|worker|area|sector <value|ANY>".into()),
                };
                Self::Filter(field, value.to_string())
            }
            "consolidate" => Self::Consolidate,
            "export" => {
                let (what, rest) = split_word(rest);
                match what.to_lowercase().as_str() {
                    "session" => {
                        let (reference, path) = split_word(rest);
                        Self::ExportSession {
                            reference: required(reference, "export session <ref> [path]")?,
                            path: optional_path(path),
                        }
                    }
                    "report" => Self::ExportReport(optional_path(rest)),
                    "records" => Self::ExportRecords(optional_path(rest)),
                    _ => return Err("usage: export session|report|records …".into()),
                }
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}' — type `help`")),
        };
        Ok(command)
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest.to_string())
    }
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

/// `ANY` (any case) or empty clears a filter field.
fn any_or<T>(
    value: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, String> {
    if value.is_empty() || value.eq_ignore_ascii_case("any") {
        Ok(None)
    } else {
        parse(value).map(Some)
    }
}

/// Parses a 1-based menu number or a label.
fn choice<T>(input: &str, all: &[T]) -> Result<T, String>
where
    T: Copy + std::str::FromStr<Err = String>,
{
    if let Ok(n) = input.trim().parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| all.get(i).copied())
            .ok_or_else(|| format!("choose 1 to {}", all.len()));
    }
    input.parse()
}

struct Shell<'a, R, W> {
    app: App,
    config: &'a Config,
    default_observer: Option<String>,
    input: R,
    out: W,
    clock: Box<dyn FnMut() -> Timestamp>,
    tz: TimeZone,
}

/// Run the shell on stdin and stdout.
pub(super) fn run(config: &Config, observer: Option<String>) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(
        config,
        observer,
        stdin.lock(),
        stdout.lock(),
        Box::new(Timestamp::now),
        TimeZone::system(),
    );
    shell.run().map_err(|e| format!("terminal I/O failed: {e}"))
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    fn new(
        config: &'a Config,
        default_observer: Option<String>,
        input: R,
        out: W,
        clock: Box<dyn FnMut() -> Timestamp>,
        tz: TimeZone,
    ) -> Self {
        let filter = Filter {
            date_range: config.default_date_range,
            ..Filter::default()
        };
        Self {
            app: App::new(filter),
            config,
            default_observer,
            input,
            out,
            clock,
            tz,
        }
    }

    fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "Wrench time — type `help` for commands")?;
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            let command = match ShellCommand::parse(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.out, "Error: {e}")?;
                    continue;
                }
            };
            match self.execute(command) {
                Ok(()) => {}
                Err(ShellError::Io(e)) => return Err(e),
                Err(e) => writeln!(self.out, "Error: {e}")?,
            }
        }

        if let Some(active) = self.app.active() {
            log::warn!(
                "discarding unfinished session for {}",
                active.session.header.worker_name
            );
            writeln!(self.out, "Unfinished session discarded")?;
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn now(&mut self) -> Timestamp {
        (self.clock)()
    }

    fn today(&mut self) -> Date {
        let now = self.now();
        now.to_zoned(self.tz.clone()).date()
    }

    fn execute(&mut self, command: ShellCommand) -> Result<(), ShellError> {
        match command {
            ShellCommand::Empty | ShellCommand::Quit => Ok(()),
            ShellCommand::Help => Ok(writeln!(self.out, "{HELP}")?),
            ShellCommand::Start => self.start(),
            ShellCommand::Options => self.options(),
            ShellCommand::Choose(level, label) => self.choose(level, &label),
            ShellCommand::Clear => {
                self.app.selection_mut()?.clear();
                Ok(writeln!(self.out, "Classification cleared")?)
            }
            ShellCommand::Next(text) => self.next(&text),
            ShellCommand::Status => self.status(),
            ShellCommand::Finish => self.finish(),
            ShellCommand::History => self.history(),
            ShellCommand::Show(reference) => self.show(&reference),
            ShellCommand::Filter(field, value) => self.filter(field, &value),
            ShellCommand::Consolidate => self.consolidate(),
            ShellCommand::ExportSession { reference, path } => {
                self.export_session(&reference, path)
            }
            ShellCommand::ExportReport(path) => self.export_report(path),
            ShellCommand::ExportRecords(path) => self.export_records(path),
        }
    }

    /// Asks one question. Input ending mid-prompt is an error.
    fn prompt(&mut self, question: &str, default: Option<&str>) -> Result<String, ShellError> {
        match default {
            Some(d) => write!(self.out, "{question} [{d}]: ")?,
            None => write!(self.out, "{question}: ")?,
        }
        self.out.flush()?;
        let answer = self
            .read_line()?
            .ok_or_else(|| ShellError::Invalid("input ended during prompt".into()))?;
        let answer = answer.trim();
        Ok(match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer.to_string(),
        })
    }

    fn start(&mut self) -> Result<(), ShellError> {
        if let Some(active) = self.app.active() {
            let worker = active.session.header.worker_name.clone();
            return Err(AppError::SessionInProgress(worker).into());
        }
        let default_observer = self.default_observer.clone();
        let observer = self.prompt("Observer", default_observer.as_deref())?;
        let worker = self.prompt("Worker", None)?;
        let order = self.prompt("Work order", None)?;
        let sector = self.prompt("Sector (1 PREDIAL, 2 RECEBIMENTO, 3 TORRE)", None)?;
        let sector = choice(&sector, &Sector::ALL).map_err(ShellError::Invalid)?;
        let area = self.prompt("Area (1 MECÂNICA, 2 ELÉTRICA)", None)?;
        let area = choice(&area, &Area::ALL).map_err(ShellError::Invalid)?;

        let header = SessionHeader::new(&observer, &worker, &order, sector, area)?;
        let now = self.now();
        let session = self.app.start_session(header, now)?;
        let line = format!(
            "Session started for {} (OS {}) at {}",
            session.header.worker_name,
            session.header.work_order,
            local_time(Some(session.started_at), &self.tz),
        );
        writeln!(self.out, "{line}")?;
        self.options()
    }

    fn options(&mut self) -> Result<(), ShellError> {
        let selection = self.app.selection_mut()?;
        let current = selection.path().display();
        let next = if selection.is_complete() {
            None
        } else {
            selection.next_options()
        };
        writeln!(self.out, "Classification: {current}")?;
        match next {
            Some((level, options)) => writeln!(self.out, "{}", format_options(level, &options))?,
            None => writeln!(self.out, "Complete — `next <text>` starts the activity")?,
        }
        Ok(())
    }

    fn choose(&mut self, level: Level, label: &str) -> Result<(), ShellError> {
        let selection = self.app.selection_mut()?;
        let label = match label.parse::<usize>() {
            Ok(n) => {
                let options = selection.options_at(level);
                n.checked_sub(1)
                    .and_then(|i| options.get(i).copied())
                    .ok_or_else(|| ShellError::Invalid(format!("no {level} option {n}")))?
            }
            Err(_) => label,
        };
        selection.set(level, label)?;
        self.options()
    }

    fn next(&mut self, text: &str) -> Result<(), ShellError> {
        let now = self.now();
        let intervals = self.app.advance(text, now)?;
        if let Some(started) = intervals.last() {
            writeln!(
                self.out,
                "#{} started: {} [{}]",
                intervals.len(),
                started.text,
                started.classification.display()
            )?;
        }
        self.options()
    }

    fn status(&mut self) -> Result<(), ShellError> {
        let now = self.now();
        let Some(active) = self.app.active() else {
            writeln!(
                self.out,
                "No session in progress ({} recorded)",
                self.app.store().len()
            )?;
            return Ok(());
        };
        let header = &active.session.header;
        let activities = if active.timeline.is_empty() {
            "No activities yet\n".to_string()
        } else {
            format_intervals(&active.timeline.intervals(), now, &self.tz)
        };
        let text = format!(
            "{} observing {} (OS {}, {}/{}) since {}\n{activities}Classification: {}",
            header.observer_name,
            header.worker_name,
            header.work_order,
            header.sector,
            header.area,
            local_time(Some(active.session.started_at), &self.tz),
            active.selection.path().display(),
        );
        Ok(writeln!(self.out, "{text}")?)
    }

    fn finish(&mut self) -> Result<(), ShellError> {
        let now = self.now();
        let record = self.app.finish(now)?;
        let totals = aggregate(&record.intervals);
        writeln!(
            self.out,
            "Session {} recorded: {} activities, {} measured",
            record.short_id(),
            totals.count_activities,
            hms(totals.total_ms),
        )?;
        for (label, ms) in sorted_desc(&totals.by_value) {
            writeln!(self.out, "  {}  {label}", hms(ms))?;
        }
        Ok(())
    }

    fn history(&mut self) -> Result<(), ShellError> {
        let store = self.app.store();
        if store.is_empty() {
            return Ok(writeln!(self.out, "No sessions recorded")?);
        }
        for (i, record) in store.list().iter().enumerate() {
            writeln!(self.out, "{}", format_record_line(i + 1, record, &self.tz))?;
        }
        Ok(())
    }

    fn show(&mut self, reference: &str) -> Result<(), ShellError> {
        let now = self.now();
        let record = self.app.store().resolve(reference)?;
        let text = format!(
            "{}\n{}",
            format_record_line(1, record, &self.tz),
            format_intervals(&record.intervals, now, &self.tz)
        );
        Ok(write!(self.out, "{text}")?)
    }

    fn filter(&mut self, field: FilterField, value: &str) -> Result<(), ShellError> {
        if field == FilterField::Worker && value.is_empty() {
            let names = worker_options(self.app.store().list()).join(", ");
            return Ok(writeln!(self.out, "Workers: {names}")?);
        }
        let filter = self.app.filter_mut();
        match field {
            FilterField::Date => {
                filter.date_range = value.parse::<DateRange>().map_err(ShellError::Invalid)?;
            }
            FilterField::Worker => {
                filter.worker = any_or(value, |v| Ok(v.to_string())).map_err(ShellError::Invalid)?;
            }
            FilterField::Area => {
                filter.area = any_or(value, str::parse).map_err(ShellError::Invalid)?;
            }
            FilterField::Sector => {
                filter.sector = any_or(value, str::parse).map_err(ShellError::Invalid)?;
            }
        }
        let text = format_filter(filter);
        log::debug!("filter set: {text}");
        Ok(writeln!(self.out, "Filter: {text}")?)
    }

    fn consolidate(&mut self) -> Result<(), ShellError> {
        let now = self.now().to_zoned(self.tz.clone());
        let report = self.app.consolidate(&now)?;
        let text = format!(
            "Filter: {}\n{}",
            format_filter(self.app.filter()),
            format_consolidation(&report)
        );
        Ok(write!(self.out, "{text}")?)
    }

    fn export_session(&mut self, reference: &str, path: Option<PathBuf>) -> Result<(), ShellError> {
        let today = self.today();
        let record = self.app.store().resolve(reference)?;
        let path = path.unwrap_or_else(|| {
            self.config
                .export_dir()
                .join(session_file_name(record, today))
        });
        write_json(&path, &session_report(record, &self.tz))?;
        log::info!("session {} exported to {}", record.short_id(), path.display());
        Ok(writeln!(self.out, "Exported → {}", path.display())?)
    }

    fn export_report(&mut self, path: Option<PathBuf>) -> Result<(), ShellError> {
        let now = self.now().to_zoned(self.tz.clone());
        let report = self.app.consolidate(&now)?;
        let path = path.unwrap_or_else(|| {
            self.config
                .export_dir()
                .join(consolidated_file_name(now.date()))
        });
        write_json(&path, &consolidated_export(&report, &self.tz))?;
        log::info!(
            "consolidated report of {} sessions exported to {}",
            report.count_sessions,
            path.display()
        );
        Ok(writeln!(self.out, "Exported → {}", path.display())?)
    }

    fn export_records(&mut self, path: Option<PathBuf>) -> Result<(), ShellError> {
        let today = self.today();
        let path = path.unwrap_or_else(|| self.config.export_dir().join(records_file_name(today)));
        let store = self.app.store();
        store.export_json(&path)?;
        log::info!("{} session records exported to {}", store.len(), path.display());
        Ok(writeln!(self.out, "Exported {} records → {}", store.len(), path.display())?)
    }
}
