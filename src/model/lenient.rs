//! Tolerant timestamp deserialization for stored and imported records.
//!
//! A timestamp that is absent, null, or unparseable reads back as `None`
//! instead of failing the whole record.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer};

pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse::<Timestamp>() {
        Ok(ts) => Some(ts),
        Err(e) => {
            log::warn!("ignoring unparseable timestamp {s:?}: {e}");
            None
        }
    }))
}
