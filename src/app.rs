//! Application state: the record store, the session in progress, and the
//! consolidation filter, owned in one place and passed to the engine explicitly.

use jiff::{Timestamp, Zoned};

use crate::consolidate::{self, ConsolidatedReport, Filter};
use crate::model::{ActivityInterval, Session, SessionHeader, SessionRecord};
use crate::store::{RecordStore, StoreError};
use crate::taxonomy::Selection;
use crate::timeline::{Timeline, TimelineError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no session in progress — use `start` first")]
    NoActiveSession,

    #[error("a session for {0} is already in progress — `finish` it first")]
    SessionInProgress(String),

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("date calculation failed: {0}")]
    Date(#[from] jiff::Error),
}

/// The session currently being observed.
#[derive(Debug)]
pub struct ActiveSession {
    pub session: Session,
    pub timeline: Timeline,
    pub selection: Selection,
}

/// Everything the front end mutates, behind one owner.
#[derive(Debug, Default)]
pub struct App {
    store: RecordStore,
    active: Option<ActiveSession>,
    filter: Filter,
}

impl App {
    pub fn new(filter: Filter) -> Self {
        Self {
            store: RecordStore::new(),
            active: None,
            filter,
        }
    }

    /// Starts observing. Only one session may run at a time.
    pub fn start_session(
        &mut self,
        header: SessionHeader,
        now: Timestamp,
    ) -> Result<&Session, AppError> {
        if let Some(active) = &self.active {
            return Err(AppError::SessionInProgress(
                active.session.header.worker_name.clone(),
            ));
        }
        log::info!(
            "session started: worker {} on order {}",
            header.worker_name,
            header.work_order
        );
        let active = self.active.insert(ActiveSession {
            session: Session {
                header,
                started_at: now,
            },
            timeline: Timeline::new(),
            selection: Selection::default(),
        });
        Ok(&active.session)
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    /// The classification being built for the next activity.
    pub fn selection_mut(&mut self) -> Result<&mut Selection, AppError> {
        self.active
            .as_mut()
            .map(|a| &mut a.selection)
            .ok_or(AppError::NoActiveSession)
    }

    /// Starts the next activity with the current selection, then clears it.
    pub fn advance(
        &mut self,
        text: &str,
        now: Timestamp,
    ) -> Result<Vec<ActivityInterval>, AppError> {
        let active = self.active.as_mut().ok_or(AppError::NoActiveSession)?;
        active
            .timeline
            .advance(text, active.selection.path().clone(), now)?;
        active.selection.clear();
        Ok(active.timeline.intervals())
    }

    /// Ends the session, closing any running activity at `now`.
    ///
    /// The finished session becomes a record holding its own copies of the
    /// header and intervals.
    pub fn finish(&mut self, now: Timestamp) -> Result<&SessionRecord, AppError> {
        let mut active = self.active.take().ok_or(AppError::NoActiveSession)?;
        let intervals = active.timeline.finish(now).to_vec();
        let record = SessionRecord::freeze(&active.session, now, intervals);
        log::info!(
            "session {} finished with {} activities",
            record.short_id(),
            record.intervals.len()
        );
        Ok(self.store.append(record)?)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut Filter {
        &mut self.filter
    }

    /// Consolidates stored records with the current filter.
    pub fn consolidate(&self, now: &Zoned) -> Result<ConsolidatedReport, AppError> {
        Ok(consolidate::consolidate(self.store.list(), &self.filter, now)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::tz::TimeZone;

    use crate::consolidate::DateRange;
    use crate::model::{Area, Sector};
    use crate::taxonomy::{ADDS_VALUE, Level, NO_VALUE};

    fn at(second: i64) -> Timestamp {
        Timestamp::from_second(1_800_000_000 + second).unwrap()
    }

    fn header(worker: &str) -> SessionHeader {
        SessionHeader::new("Observador", worker, "4500123456", Sector::Recebimento, Area::Eletrica)
            .unwrap()
    }

    fn choose_direct_work(app: &mut App) {
        let selection = app.selection_mut().unwrap();
        selection.set(Level::Value, ADDS_VALUE).unwrap();
        selection
            .set(Level::Nature, "Execução direta da atividade")
            .unwrap();
    }

    fn choose_idle(app: &mut App) {
        let selection = app.selection_mut().unwrap();
        selection.set(Level::Value, NO_VALUE).unwrap();
        selection.set(Level::Nature, "Pessoal").unwrap();
        selection
            .set(Level::Category, "Ociosidade & Comunicação pessoal")
            .unwrap();
    }

    #[test]
    fn full_session_lifecycle() {
        let mut app = App::new(Filter::default());
        app.start_session(header("Ana"), at(0)).unwrap();

        choose_direct_work(&mut app);
        app.advance("Trocar rolamento", at(0)).unwrap();
        choose_idle(&mut app);
        let intervals = app.advance("Conversa", at(60)).unwrap();
        assert_eq!(intervals.len(), 2);

        let record = app.finish(at(90)).unwrap().clone();
        assert_eq!(record.intervals.len(), 2);
        assert_eq!(record.total_ms(), 90_000);
        assert_eq!(record.started_at, Some(at(0)));
        assert_eq!(record.ended_at, Some(at(90)));
        assert!(app.active().is_none());
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn advance_clears_selection() {
        let mut app = App::new(Filter::default());
        app.start_session(header("Ana"), at(0)).unwrap();
        choose_direct_work(&mut app);
        app.advance("Trocar rolamento", at(0)).unwrap();

        assert!(!app.selection_mut().unwrap().is_complete());
    }

    #[test]
    fn rejected_advance_keeps_selection() {
        let mut app = App::new(Filter::default());
        app.start_session(header("Ana"), at(0)).unwrap();
        choose_direct_work(&mut app);

        let err = app.advance("  ", at(0)).unwrap_err();
        assert!(matches!(err, AppError::Timeline(TimelineError::EmptyText)));
        assert!(app.selection_mut().unwrap().is_complete());
        assert!(app.active().unwrap().timeline.is_empty());
    }

    #[test]
    fn one_session_at_a_time() {
        let mut app = App::new(Filter::default());
        app.start_session(header("Ana"), at(0)).unwrap();
        let err = app.start_session(header("Bruno"), at(1)).unwrap_err();
        assert!(matches!(err, AppError::SessionInProgress(ref w) if w == "Ana"));
    }

    #[test]
    fn nothing_to_do_without_session() {
        let mut app = App::new(Filter::default());
        assert!(matches!(app.selection_mut(), Err(AppError::NoActiveSession)));
        assert!(matches!(app.advance("x", at(0)), Err(AppError::NoActiveSession)));
        assert!(matches!(app.finish(at(0)), Err(AppError::NoActiveSession)));
    }

    #[test]
    fn empty_session_is_recorded() {
        let mut app = App::new(Filter::default());
        app.start_session(header("Ana"), at(0)).unwrap();
        let record = app.finish(at(30)).unwrap();

        assert!(record.intervals.is_empty());
        assert_eq!(record.total_ms(), 0);
    }

    #[test]
    fn consolidate_uses_stored_records_and_filter() {
        let mut app = App::new(Filter {
            date_range: DateRange::All,
            ..Filter::default()
        });
        for worker in ["Ana", "Bruno"] {
            app.start_session(header(worker), at(0)).unwrap();
            choose_direct_work(&mut app);
            app.advance("Trocar rolamento", at(0)).unwrap();
            app.finish(at(10)).unwrap();
        }
        app.filter_mut().worker = Some("Bruno".into());

        let now = at(100).to_zoned(TimeZone::UTC);
        let report = app.consolidate(&now).unwrap();
        assert_eq!(report.count_sessions, 1);
        assert_eq!(report.totals.total_ms, 10_000);
        assert_eq!(report.sessions[0].header.worker_name, "Bruno");
    }
}
