//! View models the host UI renders.
//!
//! A `PanelView` is rebuilt from scratch on every render; there is no diffing
//! against a previous view. Token counts start out empty and are filled in by
//! `TokenCount` session events as the host's counter resolves.

use serde::Serialize;

use crate::field_config::FieldConfig;
use crate::reconcile::{field_status, FieldStatus};
use crate::variant::Variant;

#[derive(Debug, Clone, Serialize)]
pub struct VariantItemView {
    pub index: usize,
    pub title: String,
    pub content: String,
    pub active: bool,
    /// "Use" is disabled on the item that is already active.
    pub use_enabled: bool,
    pub token_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub visible: bool,
    pub saved: bool,
    /// Offer a "save current" action when the live text matches nothing.
    pub offer_save: bool,
    pub message: String,
}

impl StatusView {
    pub fn from_status(status: FieldStatus, field: &FieldConfig) -> Self {
        let label = field.label.to_lowercase();
        match status {
            FieldStatus::Hidden => Self {
                visible: false,
                saved: false,
                offer_save: false,
                message: String::new(),
            },
            FieldStatus::Saved { .. } => Self {
                visible: true,
                saved: true,
                offer_save: false,
                message: format!("Current {} matches a saved version.", label),
            },
            FieldStatus::Unsaved => Self {
                visible: true,
                saved: false,
                offer_save: true,
                message: format!(
                    "Current {} has been modified and doesn't match any saved version.",
                    label
                ),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub field: String,
    pub entity_name: String,
    pub status: StatusView,
    pub items: Vec<VariantItemView>,
    /// True when there is nothing to list yet; the UI shows an add hint.
    pub empty_hint: bool,
}

pub fn render_panel(
    field: &FieldConfig,
    entity_name: &str,
    variants: &[Variant],
    live: &str,
) -> PanelView {
    let status = field_status(variants, live);
    let active = match status {
        FieldStatus::Saved { active } => Some(active),
        _ => None,
    };

    let items = variants
        .iter()
        .enumerate()
        .map(|(index, v)| {
            let is_active = active == Some(index);
            VariantItemView {
                index,
                title: v.title.clone(),
                content: v.content.clone(),
                active: is_active,
                use_enabled: !is_active,
                token_count: None,
            }
        })
        .collect::<Vec<_>>();

    PanelView {
        field: field.field.to_string(),
        entity_name: entity_name.to_string(),
        status: StatusView::from_status(status, field),
        empty_hint: items.is_empty(),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_config::find_field;

    #[test]
    fn test_active_item_has_use_disabled() {
        let field = find_field("description").unwrap();
        let variants = vec![
            Variant::numbered("Description", 1, "one"),
            Variant::numbered("Description", 2, "two"),
        ];
        let view = render_panel(field, "Roland", &variants, "two");

        assert!(view.status.saved);
        assert!(!view.items[0].active);
        assert!(view.items[0].use_enabled);
        assert!(view.items[1].active);
        assert!(!view.items[1].use_enabled);
    }

    #[test]
    fn test_unsaved_status_offers_save() {
        let field = find_field("description").unwrap();
        let variants = vec![Variant::numbered("Description", 1, "one")];
        let view = render_panel(field, "Roland", &variants, "edited text");

        assert!(view.status.visible);
        assert!(!view.status.saved);
        assert!(view.status.offer_save);
    }

    #[test]
    fn test_empty_live_hides_status() {
        let field = find_field("description").unwrap();
        let view = render_panel(field, "Roland", &[], "");

        assert!(!view.status.visible);
        assert!(view.empty_hint);
    }
}
