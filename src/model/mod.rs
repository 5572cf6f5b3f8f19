//! Core data model for wrench time studies.
//!
//! These types are the plain data that flows between the engine and its
//! collaborators: classification paths, activity intervals, sessions, and
//! the frozen session records kept for consolidation.

mod classification;
mod interval;
mod lenient;
mod session;

pub use classification::ClassificationPath;
pub use interval::{ActivityInterval, total_ms};
pub use session::{Area, Sector, Session, SessionError, SessionHeader, SessionRecord};
