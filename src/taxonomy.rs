//! Classification taxonomy: Value → Nature → Category → Subcategory.
//!
//! The tree is static data. Callers only see it through [`children_of`] and
//! [`validate`], so the gating rules live in one place.

mod selection;

use std::fmt;

use crate::model::ClassificationPath;

pub use selection::Selection;

/// The three Value labels, in display order.
pub const VALUE_LABELS: [&str; 3] = [ADDS_VALUE, INHERENT, NO_VALUE];

pub const ADDS_VALUE: &str = "Agrega valor";
pub const INHERENT: &str = "Inerente";
pub const NO_VALUE: &str = "Não agrega valor";

/// A depth in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Value,
    Nature,
    Category,
    Subcategory,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Value,
        Level::Nature,
        Level::Category,
        Level::Subcategory,
    ];

    /// Number of levels above this one.
    pub fn depth(self) -> usize {
        match self {
            Level::Value => 0,
            Level::Nature => 1,
            Level::Category => 2,
            Level::Subcategory => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Value => "value",
            Level::Nature => "nature",
            Level::Category => "category",
            Level::Subcategory => "subcategory",
        })
    }
}

/// Why a classification path does not fit the taxonomy.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("{0} is required")]
    Missing(Level),

    #[error("'{label}' is not a {level} option here")]
    Unknown { level: Level, label: String },

    #[error("{0} has no options here and must be left empty")]
    Unexpected(Level),
}

struct Node {
    label: &'static str,
    children: &'static [Node],
}

const fn leaf(label: &'static str) -> Node {
    Node {
        label,
        children: &[],
    }
}

// "Não relacionado à atividade" appears under both Inerente and Não agrega
// valor with different categories. Both branches are kept as recorded.
static TREE: &[Node] = &[
    Node {
        label: INHERENT,
        children: &[
            Node {
                label: "Relacionado à atividade",
                children: &[
                    Node {
                        label: "Reuniões diárias (DDS - DMS)",
                        children: &[leaf("DMS 1 - FM2C")],
                    },
                    Node {
                        label: "Comunicação operacional",
                        children: &[leaf("Diálogo/solicitação com o supervisor sobre atividade")],
                    },
                    Node {
                        label: "Deslocamento",
                        children: &[
                            leaf("Externo planejado (buscar insumos no almoxarifado)"),
                            leaf("Interno planejado (pegar ferramenta , acesso à máquina de atuação)"),
                            leaf("Interno planejado (pegar ferramenta, acesso a máquina de atuação)"),
                            leaf("Interno planejado (pegar ferramenta, acesso à máquina de atuação)"),
                        ],
                    },
                    Node {
                        label: "Organização & Preparação",
                        children: &[
                            leaf("Organização do equipamento/material utilizado"),
                            leaf("Organização do equipamentos/material utilizado"),
                            leaf("Organização do local da atividade"),
                        ],
                    },
                    Node {
                        label: "Segurança & Procedimentos",
                        children: &[
                            leaf("Abertura da PT (Permissão de Trabalho)"),
                            leaf("Abertura da PT (Permissão de trabalho)"),
                        ],
                    },
                    Node {
                        label: "Buscando recursos",
                        children: &[leaf("Deslocamento não planejado (peça não prevista)")],
                    },
                ],
            },
            Node {
                label: "Não relacionado à atividade",
                children: &[leaf("Deslocamento")],
            },
        ],
    },
    Node {
        label: ADDS_VALUE,
        children: &[leaf("Execução direta da atividade")],
    },
    Node {
        label: NO_VALUE,
        children: &[
            Node {
                label: "Pessoal",
                children: &[leaf("Ociosidade & Comunicação pessoal")],
            },
            Node {
                label: "Não relacionado à atividade",
                children: &[Node {
                    label: "Pessoal inevitável",
                    children: &[
                        leaf("Alimentação"),
                        leaf("Bebendo água"),
                        leaf("Uso do banheiro"),
                    ],
                }],
            },
            Node {
                label: "Relacionado à atividade",
                children: &[leaf("Reuniões diárias (DDS - DMS)")],
            },
            Node {
                label: "Recursos",
                children: &[leaf("Subutilização de recursos")],
            },
        ],
    },
];

/// Options one level below `prefix`, where `prefix` holds 0–3 chosen labels.
///
/// Empty when the prefix is unknown or already at a terminal node.
pub fn children_of(prefix: &[&str]) -> Vec<&'static str> {
    if prefix.len() >= Level::ALL.len() {
        return Vec::new();
    }
    let mut level = TREE;
    for label in prefix {
        match level.iter().find(|node| node.label == *label) {
            Some(node) => level = node.children,
            None => return Vec::new(),
        }
    }
    level.iter().map(|node| node.label).collect()
}

/// Checks a path against the gating rules.
///
/// Value and nature are always required. Category is required exactly when
/// the taxonomy offers categories for the chosen value and nature, and
/// subcategory likewise for the chosen category.
pub fn validate(path: &ClassificationPath) -> Result<(), ClassificationError> {
    let chosen: Vec<Option<&str>> = [&path.value, &path.nature, &path.category, &path.subcategory]
        .into_iter()
        .map(|slot| slot.as_deref().filter(|s| !s.trim().is_empty()))
        .collect();

    let mut prefix: Vec<&str> = Vec::new();
    for (level, choice) in Level::ALL.into_iter().zip(chosen.iter().copied()) {
        let options = children_of(&prefix);
        match choice {
            Some(label) => {
                if options.is_empty() {
                    return Err(ClassificationError::Unexpected(level));
                }
                if !options.iter().any(|option| *option == label) {
                    return Err(ClassificationError::Unknown {
                        level,
                        label: label.to_string(),
                    });
                }
                prefix.push(label);
            }
            None => {
                if !options.is_empty() {
                    return Err(ClassificationError::Missing(level));
                }
                // Nothing may hang below an empty level.
                if let Some(orphan) = Level::ALL[level.depth() + 1..]
                    .iter()
                    .zip(&chosen[level.depth() + 1..])
                    .find_map(|(l, c)| c.is_some().then_some(*l))
                {
                    return Err(ClassificationError::Unexpected(orphan));
                }
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_offers_three_values() {
        let values = children_of(&[]);
        assert_eq!(values.len(), 3);
        for label in VALUE_LABELS {
            assert!(values.contains(&label), "missing {label}");
        }
    }

    #[test]
    fn terminal_nature_has_no_categories() {
        assert!(children_of(&[ADDS_VALUE, "Execução direta da atividade"]).is_empty());
    }

    #[test]
    fn unknown_or_too_deep_prefix_is_empty() {
        assert!(children_of(&["Talvez"]).is_empty());
        assert!(children_of(&[INHERENT, "Nada"]).is_empty());
        assert!(
            children_of(&[
                NO_VALUE,
                "Não relacionado à atividade",
                "Pessoal inevitável",
                "Alimentação",
            ])
            .is_empty()
        );
    }

    #[test]
    fn duplicated_nature_keeps_both_branches() {
        assert_eq!(
            children_of(&[INHERENT, "Não relacionado à atividade"]),
            vec!["Deslocamento"]
        );
        assert_eq!(
            children_of(&[NO_VALUE, "Não relacionado à atividade"]),
            vec!["Pessoal inevitável"]
        );
    }

    #[test]
    fn subcategory_options_follow_category() {
        let subs = children_of(&[NO_VALUE, "Não relacionado à atividade", "Pessoal inevitável"]);
        assert_eq!(subs, vec!["Alimentação", "Bebendo água", "Uso do banheiro"]);
    }

    #[test]
    fn validate_accepts_terminal_nature_without_category() {
        let path = ClassificationPath::new(ADDS_VALUE, "Execução direta da atividade", "", "");
        assert_eq!(validate(&path), Ok(()));
    }

    #[test]
    fn validate_accepts_category_without_subcategories() {
        let path =
            ClassificationPath::new(NO_VALUE, "Pessoal", "Ociosidade & Comunicação pessoal", "");
        assert_eq!(validate(&path), Ok(()));
    }

    #[test]
    fn validate_requires_value_and_nature() {
        assert_eq!(
            validate(&ClassificationPath::default()),
            Err(ClassificationError::Missing(Level::Value))
        );
        assert_eq!(
            validate(&ClassificationPath::new(INHERENT, "", "", "")),
            Err(ClassificationError::Missing(Level::Nature))
        );
    }

    #[test]
    fn validate_requires_offered_category_and_subcategory() {
        let no_category = ClassificationPath::new(INHERENT, "Relacionado à atividade", "", "");
        assert_eq!(
            validate(&no_category),
            Err(ClassificationError::Missing(Level::Category))
        );

        let no_sub =
            ClassificationPath::new(INHERENT, "Relacionado à atividade", "Deslocamento", "");
        assert_eq!(
            validate(&no_sub),
            Err(ClassificationError::Missing(Level::Subcategory))
        );
    }

    #[test]
    fn validate_rejects_labels_outside_the_tree() {
        let path = ClassificationPath::new(INHERENT, "Pessoal", "", "");
        assert_eq!(
            validate(&path),
            Err(ClassificationError::Unknown {
                level: Level::Nature,
                label: "Pessoal".into()
            })
        );

        let extra =
            ClassificationPath::new(ADDS_VALUE, "Execução direta da atividade", "Qualquer", "");
        assert_eq!(
            validate(&extra),
            Err(ClassificationError::Unexpected(Level::Category))
        );
    }

    #[test]
    fn validate_rejects_orphaned_levels() {
        let path = ClassificationPath {
            value: Some(INHERENT.into()),
            nature: None,
            category: Some("Deslocamento".into()),
            subcategory: None,
        };
        assert_eq!(
            validate(&path),
            Err(ClassificationError::Missing(Level::Nature))
        );

        let terminal_with_sub = ClassificationPath {
            value: Some(ADDS_VALUE.into()),
            nature: Some("Execução direta da atividade".into()),
            category: None,
            subcategory: Some("Algo".into()),
        };
        assert_eq!(
            validate(&terminal_with_sub),
            Err(ClassificationError::Unexpected(Level::Subcategory))
        );
    }
}
