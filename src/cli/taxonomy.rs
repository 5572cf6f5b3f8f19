//! Taxonomy browsing command.

use crate::taxonomy::{Level, Selection};

pub(super) fn cmd_taxonomy(
    value: Option<&str>,
    nature: Option<&str>,
    category: Option<&str>,
) -> Result<(), String> {
    let options = options_under(value, nature, category)?;
    if options.is_empty() {
        eprintln!("No further options — this classification is complete");
        return Ok(());
    }
    for option in options {
        println!("{option}");
    }
    Ok(())
}

/// Options offered below the given prefix. Labels match case-insensitively.
fn options_under(
    value: Option<&str>,
    nature: Option<&str>,
    category: Option<&str>,
) -> Result<Vec<&'static str>, String> {
    let mut selection = Selection::default();
    let mut depth = 0;
    for (level, label) in Level::ALL.into_iter().zip([value, nature, category]) {
        let Some(label) = label else { continue };
        if level.depth() != depth {
            return Err(format!("--{level} needs --{}", Level::ALL[depth]));
        }
        selection.set(level, label).map_err(|e| e.to_string())?;
        depth += 1;
    }
    Ok(selection.options_at(Level::ALL[depth]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::taxonomy::{ADDS_VALUE, INHERENT, NO_VALUE};

    #[test]
    fn no_prefix_lists_values() {
        assert_eq!(
            options_under(None, None, None).unwrap(),
            vec![INHERENT, ADDS_VALUE, NO_VALUE]
        );
    }

    #[test]
    fn prefix_lists_children() {
        let options =
            options_under(Some("inerente"), Some("Não relacionado à atividade"), None).unwrap();
        assert_eq!(options, vec!["Deslocamento"]);
    }

    #[test]
    fn terminal_prefix_lists_nothing() {
        let options = options_under(
            Some(INHERENT),
            Some("Não relacionado à atividade"),
            Some("Deslocamento"),
        )
        .unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn gap_in_prefix_is_an_error() {
        let err = options_under(None, Some("Pessoal"), None).unwrap_err();
        assert_eq!(err, "--nature needs --value");
    }

    #[test]
    fn unknown_label_is_an_error() {
        assert!(options_under(Some("Talvez"), None, None).is_err());
    }
}
