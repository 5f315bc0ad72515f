pub mod aliases;
pub mod constants;
pub mod kinds;

pub use kinds::{ControlKind, SelectKind};

#[cfg(test)]
mod tests {
    use super::aliases;
    use super::kinds::{ControlKind, SelectKind};

    #[test]
    fn control_aliases_resolve() {
        assert_eq!(aliases::control("group"), Some(ControlKind::Group));
        assert_eq!(aliases::control("looped group"), Some(ControlKind::Repeat));
        assert_eq!(aliases::control("lgroup"), Some(ControlKind::Repeat));
        assert_eq!(aliases::control("loop"), Some(ControlKind::Loop));
        assert_eq!(aliases::control("table"), None);
    }

    #[test]
    fn every_listed_alias_has_a_mapping() {
        for alias in aliases::CONTROL_ALIASES {
            assert!(aliases::control(alias).is_some(), "unmapped: {alias}");
        }
        for alias in aliases::SELECT_ALIASES {
            assert!(aliases::select(alias).is_some(), "unmapped: {alias}");
        }
    }

    #[test]
    fn select_aliases_are_longest_first() {
        let lengths: Vec<usize> = aliases::SELECT_ALIASES.iter().map(|a| a.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn from_file_commands_are_flagged() {
        let alias = aliases::select("select_multiple_from_file").unwrap();
        assert_eq!(alias.kind, SelectKind::Multiple);
        assert!(alias.from_file);
        let alias = aliases::select("select_one").unwrap();
        assert!(!alias.from_file);
    }

    #[test]
    fn yes_no_covers_free_text_spellings() {
        assert_eq!(aliases::yes_no("true()"), Some(true));
        assert_eq!(aliases::yes_no("NO"), Some(false));
        assert_eq!(aliases::yes_no("maybe"), None);
    }
}
