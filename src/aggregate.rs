//! Aggregation: elapsed time per classification bucket.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::ActivityInterval;

/// Bucket for intervals with no label at a level.
pub const NOT_INFORMED: &str = "(Não informado)";

/// Milliseconds per label at one taxonomy level.
pub type Totals = BTreeMap<String, u64>;

/// Time totals over a set of intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub total_ms: u64,

    /// Every interval counts, complete or not.
    pub count_activities: usize,

    pub by_value: Totals,
    pub by_nature: Totals,
    pub by_category: Totals,
}

/// Sums interval durations per Value, Nature and Category.
///
/// Open or malformed intervals are counted but add no time.
pub fn aggregate<'a>(intervals: impl IntoIterator<Item = &'a ActivityInterval>) -> Aggregation {
    let mut agg = Aggregation::default();
    for interval in intervals {
        agg.count_activities += 1;
        let ms = interval.elapsed_ms();
        agg.total_ms += ms;

        let path = &interval.classification;
        add(&mut agg.by_value, path.value.as_deref(), ms);
        add(&mut agg.by_nature, path.nature.as_deref(), ms);
        add(&mut agg.by_category, path.category.as_deref(), ms);
    }
    agg
}

fn add(totals: &mut Totals, key: Option<&str>, ms: u64) {
    let key = key.filter(|k| !k.trim().is_empty()).unwrap_or(NOT_INFORMED);
    *totals.entry(key.to_string()).or_default() += ms;
}

/// Entries ordered by descending time; ties keep label order.
pub fn sorted_desc(totals: &Totals) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = totals.iter().map(|(k, ms)| (k.as_str(), *ms)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}
