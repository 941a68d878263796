//! The stored variant shape, across schema generations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One saved alternate text for a field. Array order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub title: String,
    pub content: String,
}

impl Variant {
    /// A variant titled with the field's numbering scheme ("Description #3").
    pub fn numbered(label: &str, n: usize, content: &str) -> Self {
        Self {
            title: format!("{} #{}", label, n),
            content: content.to_string(),
        }
    }
}

/// Element shapes found in stored data. `Current` must come first so a
/// `{title, content}` object never falls through to the legacy arm.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredVariant {
    Current { title: String, content: String },
    Legacy { title: String, description: String },
    Bare(String),
}

/// Decodes a stored variant array, upgrading legacy elements in place.
///
/// Bare strings get numbered titles in their original order; legacy objects
/// keep their title and rename `description` to `content`. Elements that fit
/// no known shape are skipped.
pub fn decode_stored(value: &Value, label: &str) -> Vec<Variant> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            match serde_json::from_value::<StoredVariant>(item.clone()).ok()? {
                StoredVariant::Current { title, content } => Some(Variant { title, content }),
                StoredVariant::Legacy { title, description } => Some(Variant {
                    title,
                    content: description,
                }),
                StoredVariant::Bare(content) => Some(Variant::numbered(label, i + 1, &content)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_current_shape() {
        let value = json!([{"title": "Primary", "content": "A tall knight."}]);
        let variants = decode_stored(&value, "Description");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].title, "Primary");
        assert_eq!(variants[0].content, "A tall knight.");
    }

    #[test]
    fn test_decode_bare_strings_get_numbered_titles() {
        let value = json!(["first", "second", "third"]);
        let variants = decode_stored(&value, "Description");
        assert_eq!(variants.len(), 3);
        assert_eq!(variants[0].title, "Description #1");
        assert_eq!(variants[1].title, "Description #2");
        assert_eq!(variants[2].title, "Description #3");
        assert_eq!(variants[2].content, "third");
    }

    #[test]
    fn test_decode_legacy_objects_keep_titles() {
        let value = json!([{"title": "Backup", "description": "old text"}]);
        let variants = decode_stored(&value, "Description");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].title, "Backup");
        assert_eq!(variants[0].content, "old text");
    }

    #[test]
    fn test_decode_skips_unknown_shapes() {
        let value = json!([42, {"title": "ok", "content": "kept"}, null]);
        let variants = decode_stored(&value, "Description");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].content, "kept");
    }

    #[test]
    fn test_decode_non_array_is_empty() {
        assert!(decode_stored(&json!({"title": "x"}), "Description").is_empty());
        assert!(decode_stored(&json!(null), "Description").is_empty());
    }
}
