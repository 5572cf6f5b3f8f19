//! Interval timeline: the ordered activities of one session.
//!
//! A timeline is a small state machine. At most one interval is open, and it
//! is always the last one. Opening the next interval closes the current one
//! at the same instant, so adjacent intervals never overlap or leave a gap.
//! `finish` closes whatever is open and freezes the timeline.

use std::mem;

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{ActivityInterval, ClassificationPath};
use crate::taxonomy::{self, ClassificationError};

/// Reasons an advance is rejected. A rejected advance changes nothing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("activity text cannot be empty")]
    EmptyText,

    #[error("incomplete classification: {0}")]
    Classification(#[from] ClassificationError),

    #[error("the session is already finished")]
    Finished,
}

/// The interval currently being timed.
#[derive(Debug, Clone)]
struct OpenInterval {
    id: Uuid,
    text: String,
    classification: ClassificationPath,
    start_at: Timestamp,
}

impl OpenInterval {
    fn close(self, end_at: Timestamp) -> ActivityInterval {
        ActivityInterval {
            id: self.id,
            text: self.text,
            classification: self.classification,
            start_at: Some(self.start_at),
            end_at: Some(end_at),
        }
    }

    fn snapshot(&self) -> ActivityInterval {
        ActivityInterval {
            id: self.id,
            text: self.text.clone(),
            classification: self.classification.clone(),
            start_at: Some(self.start_at),
            end_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum State {
    /// Nothing is being timed.
    #[default]
    Closed,

    /// The trailing interval is running.
    Open(OpenInterval),

    /// The session ended; the closed list is final.
    Finished,
}

/// Ordered activity intervals for one session.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    closed: Vec<ActivityInterval>,
    state: State,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new activity at `now`, closing the running one at the same instant.
    ///
    /// Text must be non-blank and the classification must satisfy the
    /// taxonomy's gating rules. The text is stored as given.
    pub fn advance(
        &mut self,
        text: &str,
        classification: ClassificationPath,
        now: Timestamp,
    ) -> Result<(), TimelineError> {
        if self.is_finished() {
            return Err(TimelineError::Finished);
        }
        if text.trim().is_empty() {
            return Err(TimelineError::EmptyText);
        }
        taxonomy::validate(&classification)?;

        let next = OpenInterval {
            id: Uuid::new_v4(),
            text: text.to_string(),
            classification,
            start_at: now,
        };
        if let State::Open(current) = mem::replace(&mut self.state, State::Open(next)) {
            self.closed.push(current.close(now));
        }
        log::debug!(
            "advanced timeline to activity {} at {now}",
            self.closed.len() + 1
        );
        Ok(())
    }

    /// Closes the running activity at `now` and freezes the timeline.
    ///
    /// Calling it again returns the same intervals unchanged.
    pub fn finish(&mut self, now: Timestamp) -> &[ActivityInterval] {
        if let State::Open(current) = mem::replace(&mut self.state, State::Finished) {
            self.closed.push(current.close(now));
        }
        &self.closed
    }

    /// All intervals in creation order; a running one comes last with no end.
    pub fn intervals(&self) -> Vec<ActivityInterval> {
        let mut all = self.closed.clone();
        if let State::Open(open) = &self.state {
            all.push(open.snapshot());
        }
        all
    }

    pub fn has_running(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }

    pub fn len(&self) -> usize {
        self.closed.len() + usize::from(self.has_running())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
