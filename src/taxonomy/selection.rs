//! Cascading selection: choose one level at a time, clearing what lies below.

use crate::model::ClassificationPath;

use super::{ClassificationError, Level, children_of, validate};

/// The classification being assembled for the next activity.
///
/// Choosing a level always clears every level beneath it, so a selection
/// can never carry a category from a different nature.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    path: ClassificationPath,
}

impl Selection {
    pub fn path(&self) -> &ClassificationPath {
        &self.path
    }

    /// Chooses `label` at `level`.
    ///
    /// The label is matched case-insensitively against the offered options
    /// and stored in its canonical spelling. All parent levels must already
    /// be chosen.
    pub fn set(&mut self, level: Level, label: &str) -> Result<&'static str, ClassificationError> {
        let depth = level.depth();
        let chosen = self.path.levels();
        if chosen.len() < depth {
            return Err(ClassificationError::Missing(Level::ALL[chosen.len()]));
        }

        let options = children_of(&chosen[..depth]);
        if options.is_empty() {
            return Err(ClassificationError::Unexpected(level));
        }
        // Some sibling labels differ only by case; an exact match wins.
        let label = label.trim();
        let wanted = label.to_lowercase();
        let exact = options.iter().copied().find(|o| *o == label);
        let folded = || options.iter().copied().find(|o| o.to_lowercase() == wanted);
        let Some(option) = exact.or_else(folded) else {
            return Err(ClassificationError::Unknown {
                level,
                label: label.to_string(),
            });
        };

        let mut slots = self.slots_mut();
        *slots[depth] = Some(option.to_string());
        for slot in &mut slots[depth + 1..] {
            **slot = None;
        }
        Ok(option)
    }

    /// Options offered at `level` given the levels chosen above it.
    ///
    /// Empty while a parent level is still unchosen.
    pub fn options_at(&self, level: Level) -> Vec<&'static str> {
        let chosen = self.path.levels();
        match chosen.get(..level.depth()) {
            Some(prefix) => children_of(prefix),
            None => Vec::new(),
        }
    }

    /// The first unchosen level that has options, with those options.
    ///
    /// `None` once the path reaches a terminal node.
    pub fn next_options(&self) -> Option<(Level, Vec<&'static str>)> {
        let chosen = self.path.levels();
        let level = *Level::ALL.get(chosen.len())?;
        let options = children_of(&chosen);
        if options.is_empty() {
            None
        } else {
            Some((level, options))
        }
    }

    pub fn is_complete(&self) -> bool {
        validate(&self.path).is_ok()
    }

    pub fn clear(&mut self) {
        self.path = ClassificationPath::default();
    }

    fn slots_mut(&mut self) -> [&mut Option<String>; 4] {
        let p = &mut self.path;
        [
            &mut p.value,
            &mut p.nature,
            &mut p.category,
            &mut p.subcategory,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::taxonomy::{ADDS_VALUE, INHERENT, NO_VALUE};

    fn full_selection() -> Selection {
        let mut selection = Selection::default();
        selection.set(Level::Value, INHERENT).unwrap();
        selection.set(Level::Nature, "Relacionado à atividade").unwrap();
        selection.set(Level::Category, "Deslocamento").unwrap();
        selection
            .set(
                Level::Subcategory,
                "Externo planejado (buscar insumos no almoxarifado)",
            )
            .unwrap();
        selection
    }

    #[test]
    fn full_cascade_is_complete() {
        let selection = full_selection();
        assert!(selection.is_complete());
        assert_eq!(selection.next_options(), None);
    }

    #[test]
    fn changing_value_resets_descendants() {
        let mut selection = full_selection();
        selection.set(Level::Value, NO_VALUE).unwrap();

        let path = selection.path();
        assert_eq!(path.value.as_deref(), Some(NO_VALUE));
        assert_eq!(path.nature, None);
        assert_eq!(path.category, None);
        assert_eq!(path.subcategory, None);
        assert!(!selection.is_complete());
    }

    #[test]
    fn changing_nature_resets_category_and_subcategory() {
        let mut selection = full_selection();
        selection.set(Level::Nature, "Não relacionado à atividade").unwrap();

        assert_eq!(selection.path().category, None);
        assert_eq!(selection.path().subcategory, None);
        let (level, options) = selection.next_options().unwrap();
        assert_eq!(level, Level::Category);
        assert_eq!(options, vec!["Deslocamento"]);
    }

    #[test]
    fn labels_match_case_insensitively() {
        let mut selection = Selection::default();
        let canonical = selection.set(Level::Value, "  agrega VALOR ").unwrap();
        assert_eq!(canonical, ADDS_VALUE);
        assert_eq!(selection.path().value.as_deref(), Some(ADDS_VALUE));
    }

    #[test]
    fn exact_spelling_wins_over_case_folded_sibling() {
        let mut selection = Selection::default();
        selection.set(Level::Value, INHERENT).unwrap();
        selection.set(Level::Nature, "Relacionado à atividade").unwrap();
        selection.set(Level::Category, "Segurança & Procedimentos").unwrap();

        let chosen = selection
            .set(Level::Subcategory, "Abertura da PT (Permissão de trabalho)")
            .unwrap();
        assert_eq!(chosen, "Abertura da PT (Permissão de trabalho)");
    }

    #[test]
    fn terminal_nature_completes_without_category() {
        let mut selection = Selection::default();
        selection.set(Level::Value, ADDS_VALUE).unwrap();
        assert!(!selection.is_complete());
        selection
            .set(Level::Nature, "Execução direta da atividade")
            .unwrap();

        assert!(selection.is_complete());
        assert_eq!(selection.next_options(), None);
        assert_eq!(
            selection.set(Level::Category, "Qualquer"),
            Err(ClassificationError::Unexpected(Level::Category))
        );
    }

    #[test]
    fn rejects_level_without_parent() {
        let mut selection = Selection::default();
        assert_eq!(
            selection.set(Level::Category, "Deslocamento"),
            Err(ClassificationError::Missing(Level::Value))
        );
    }

    #[test]
    fn rejects_unknown_label_without_changing_state() {
        let mut selection = full_selection();
        let err = selection.set(Level::Nature, "Pessoal").unwrap_err();
        assert!(matches!(err, ClassificationError::Unknown { .. }));
        assert!(selection.is_complete());
    }

    #[test]
    fn options_at_follow_chosen_parents() {
        let mut selection = Selection::default();
        assert_eq!(selection.options_at(Level::Value).len(), 3);
        assert!(selection.options_at(Level::Nature).is_empty());

        selection.set(Level::Value, NO_VALUE).unwrap();
        assert_eq!(selection.options_at(Level::Nature).len(), 4);
        assert!(selection.options_at(Level::Category).is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let mut selection = full_selection();
        selection.clear();
        assert_eq!(selection.path(), &ClassificationPath::default());
        let (level, options) = selection.next_options().unwrap();
        assert_eq!(level, Level::Value);
        assert_eq!(options.len(), 3);
    }
}
