//! Classification path: the four-level label attached to an activity.

use serde::{Deserialize, Serialize};

/// A selection through the taxonomy: Value → Nature → Category → Subcategory.
///
/// Unselected levels are `None`. Validity against the taxonomy is checked by
/// [`crate::taxonomy::validate`], not by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationPath {
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub nature: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub subcategory: Option<String>,
}

impl ClassificationPath {
    /// Builds a path from plain labels; empty strings count as unselected.
    #[cfg(test)]
    pub fn new(value: &str, nature: &str, category: &str, subcategory: &str) -> Self {
        Self {
            value: non_blank(value),
            nature: non_blank(nature),
            category: non_blank(category),
            subcategory: non_blank(subcategory),
        }
    }

    /// The selected levels in order, stopping at the first unselected one.
    pub fn levels(&self) -> Vec<&str> {
        [&self.value, &self.nature, &self.category, &self.subcategory]
            .into_iter()
            .map_while(|level| level.as_deref().filter(|l| !l.trim().is_empty()))
            .collect()
    }

    /// `"Value > Nature > Category"`, or `"—"` when nothing is selected.
    pub fn display(&self) -> String {
        let parts: Vec<&str> = [&self.value, &self.nature, &self.category, &self.subcategory]
            .into_iter()
            .filter_map(|level| level.as_deref())
            .filter(|l| !l.is_empty())
            .collect();
        if parts.is_empty() {
            "—".to_string()
        } else {
            parts.join(" > ")
        }
    }
}

#[cfg(test)]
fn non_blank(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
