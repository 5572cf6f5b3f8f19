//! Session types: one observation run and its frozen record.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActivityInterval, lenient};

/// Errors raised when a session header is incomplete.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Plant sector where the observed work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sector {
    Predial,
    Recebimento,
    Torre,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::Predial, Sector::Recebimento, Sector::Torre];

    pub fn label(self) -> &'static str {
        match self {
            Sector::Predial => "PREDIAL",
            Sector::Recebimento => "RECEBIMENTO",
            Sector::Torre => "TORRE",
        }
    }
}

/// Trade of the observed worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "MECÂNICA")]
    Mecanica,
    #[serde(rename = "ELÉTRICA")]
    Eletrica,
}

impl Area {
    pub const ALL: [Area; 2] = [Area::Mecanica, Area::Eletrica];

    pub fn label(self) -> &'static str {
        match self {
            Area::Mecanica => "MECÂNICA",
            Area::Eletrica => "ELÉTRICA",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PREDIAL" => Ok(Sector::Predial),
            "RECEBIMENTO" => Ok(Sector::Recebimento),
            "TORRE" => Ok(Sector::Torre),
            _ => Err(format!(
                "unknown sector '{s}' (expected PREDIAL, RECEBIMENTO or TORRE)"
            )),
        }
    }
}

impl FromStr for Area {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MECÂNICA" | "MECANICA" => Ok(Area::Mecanica),
            "ELÉTRICA" | "ELETRICA" => Ok(Area::Eletrica),
            _ => Err(format!(
                "unknown area '{s}' (expected MECÂNICA or ELÉTRICA)"
            )),
        }
    }
}

/// Who is observed, by whom, and on which work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHeader {
    pub observer_name: String,
    pub worker_name: String,
    pub work_order: String,
    pub sector: Sector,
    pub area: Area,
}

impl SessionHeader {
    /// Builds a header from form input, trimming every text field.
    pub fn new(
        observer_name: &str,
        worker_name: &str,
        work_order: &str,
        sector: Sector,
        area: Area,
    ) -> Result<Self, SessionError> {
        Ok(Self {
            observer_name: required("observer name", observer_name)?,
            worker_name: required("worker name", worker_name)?,
            work_order: required("work order", work_order)?,
            sector,
            area,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, SessionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// An observation run in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub header: SessionHeader,
    pub started_at: Timestamp,
}

/// A finished session with its frozen intervals. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,

    #[serde(flatten)]
    pub header: SessionHeader,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub started_at: Option<Timestamp>,

    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub ended_at: Option<Timestamp>,

    pub intervals: Vec<ActivityInterval>,
}

impl SessionRecord {
    /// Freezes a session into a record, copying the header by value.
    pub fn freeze(
        session: &Session,
        ended_at: Timestamp,
        intervals: Vec<ActivityInterval>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            header: session.header.clone(),
            started_at: Some(session.started_at),
            ended_at: Some(ended_at),
            intervals,
        }
    }

    /// Sum of the record's interval durations.
    pub fn total_ms(&self) -> u64 {
        super::total_ms(&self.intervals)
    }

    /// First eight characters of the record id.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}
