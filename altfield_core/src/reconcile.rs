//! Derives the panel status from the live editor text and the saved list.
//!
//! Pure functions; no state. "Active" is re-derived on every call by trimmed
//! string comparison rather than tracked as persisted state.

use serde::Serialize;

use crate::variant::Variant;

/// Status shown above the variant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FieldStatus {
    /// Live field is empty; the indicator is hidden.
    Hidden,
    /// Live text matches the variant at `active`; its "use" control is disabled.
    Saved { active: usize },
    /// Live text matches nothing saved; offer to save it as a new variant.
    Unsaved,
}

/// First variant whose trimmed content equals the trimmed live text.
pub fn match_index(variants: &[Variant], live: &str) -> Option<usize> {
    let live = live.trim();
    variants.iter().position(|v| v.content.trim() == live)
}

pub fn field_status(variants: &[Variant], live: &str) -> FieldStatus {
    if live.trim().is_empty() {
        return FieldStatus::Hidden;
    }
    match match_index(variants, live) {
        Some(active) => FieldStatus::Saved { active },
        None => FieldStatus::Unsaved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants(contents: &[&str]) -> Vec<Variant> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Variant::numbered("Description", i + 1, c))
            .collect()
    }

    #[test]
    fn test_match_is_trimmed_equality() {
        let list = variants(&["hello world", "second"]);
        assert_eq!(match_index(&list, "  hello world \n"), Some(0));
        assert_eq!(match_index(&list, "second"), Some(1));
        assert_eq!(match_index(&list, "hello"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let list = variants(&["same", "same"]);
        assert_eq!(match_index(&list, "same"), Some(0));
    }

    #[test]
    fn test_status_hidden_when_live_empty() {
        let list = variants(&["text"]);
        assert_eq!(field_status(&list, ""), FieldStatus::Hidden);
        assert_eq!(field_status(&list, "   \n"), FieldStatus::Hidden);
    }

    #[test]
    fn test_status_saved_and_unsaved() {
        let list = variants(&["alpha", "beta"]);
        assert_eq!(field_status(&list, "beta"), FieldStatus::Saved { active: 1 });
        assert_eq!(field_status(&list, "gamma"), FieldStatus::Unsaved);
    }

    #[test]
    fn test_status_unsaved_with_empty_list() {
        assert_eq!(field_status(&[], "anything"), FieldStatus::Unsaved);
    }
}
