//! Variant persistence over the host's per-entity extension data.
//!
//! The host owns character records; this adapter only reads and writes the
//! extension values attached to them. Legacy storage keys are migrated to the
//! current nested schema the first time they are seen, then deleted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::field_config::{FieldConfig, EXTENSION_KEY};
use crate::variant::{decode_stored, Variant};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown character: {0}")]
    UnknownEntity(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// The entity a variant list belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityId {
    /// In-progress character creation; data lives in memory only.
    Draft,
    /// A saved character record owned by the host.
    Saved(String),
}

/// Host capability: extension values attached to an entity's record.
pub trait ExtensionStore: Send + Sync {
    fn read_extension(&self, entity: &EntityId, key: &str) -> Result<Option<Value>, StoreError>;
    fn write_extension(&self, entity: &EntityId, key: &str, value: Value) -> Result<(), StoreError>;
    fn delete_extension(&self, entity: &EntityId, key: &str) -> Result<(), StoreError>;
}

/// In-memory extension backend for character-creation drafts. There is only
/// ever one draft, so the entity argument is ignored.
#[derive(Default)]
pub struct DraftStore {
    data: Mutex<HashMap<String, Value>>,
}

impl DraftStore {
    /// Forget everything; called when the draft is saved or discarded.
    pub fn clear(&self) {
        self.data.lock().unwrap().clear();
    }
}

impl ExtensionStore for DraftStore {
    fn read_extension(&self, _entity: &EntityId, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn write_extension(&self, _entity: &EntityId, key: &str, value: Value) -> Result<(), StoreError> {
        self.data.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn delete_extension(&self, _entity: &EntityId, key: &str) -> Result<(), StoreError> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Load/save adapter for one entity's variant lists.
#[derive(Clone)]
pub struct VariantStore {
    backend: Arc<dyn ExtensionStore>,
}

impl VariantStore {
    pub fn new(backend: Arc<dyn ExtensionStore>) -> Self {
        Self { backend }
    }

    /// Loads the ordered variant list for a field, migrating legacy storage
    /// on the way: if the current schema has no entry but the field's legacy
    /// key holds data, the decoded list is persisted under the current schema
    /// and the legacy key is deleted. One-directional; no rollback.
    pub fn load(&self, entity: &EntityId, field: &FieldConfig) -> Result<Vec<Variant>, StoreError> {
        if let Some(map) = self.backend.read_extension(entity, EXTENSION_KEY)? {
            if let Some(list) = map.get(field.field) {
                return Ok(decode_stored(list, field.label));
            }
        }

        if let Some(legacy) = self.backend.read_extension(entity, field.legacy_key)? {
            let variants = decode_stored(&legacy, field.label);
            self.save(entity, field, &variants)?;
            self.backend.delete_extension(entity, field.legacy_key)?;
            return Ok(variants);
        }

        Ok(Vec::new())
    }

    /// Writes the full list for a field, preserving other fields' entries
    /// under the shared extension key.
    pub fn save(
        &self,
        entity: &EntityId,
        field: &FieldConfig,
        variants: &[Variant],
    ) -> Result<(), StoreError> {
        let mut map = match self.backend.read_extension(entity, EXTENSION_KEY)? {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        let encoded =
            serde_json::to_value(variants).map_err(|e| StoreError::Backend(e.to_string()))?;
        map.insert(field.field.to_string(), encoded);
        self.backend.write_extension(entity, EXTENSION_KEY, Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_config::find_field;
    use serde_json::json;

    fn store() -> (VariantStore, Arc<DraftStore>) {
        let backend = Arc::new(DraftStore::default());
        (VariantStore::new(backend.clone() as Arc<dyn ExtensionStore>), backend)
    }

    #[test]
    fn test_load_empty() {
        let (store, _) = store();
        let field = find_field("description").unwrap();
        assert!(store.load(&EntityId::Draft, field).unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (store, _) = store();
        let field = find_field("description").unwrap();
        let variants = vec![Variant::numbered("Description", 1, "hello")];
        store.save(&EntityId::Draft, field, &variants).unwrap();
        assert_eq!(store.load(&EntityId::Draft, field).unwrap(), variants);
    }

    #[test]
    fn test_legacy_bare_strings_migrate_once() {
        let (store, backend) = store();
        let field = find_field("description").unwrap();
        backend
            .write_extension(&EntityId::Draft, field.legacy_key, json!(["one", "two"]))
            .unwrap();

        let variants = store.load(&EntityId::Draft, field).unwrap();
        assert_eq!(variants[0].title, "Description #1");
        assert_eq!(variants[1].title, "Description #2");
        assert_eq!(variants[1].content, "two");

        // Obsolete key is gone; the migrated form lives under the current key.
        assert!(backend
            .read_extension(&EntityId::Draft, field.legacy_key)
            .unwrap()
            .is_none());
        let current = backend
            .read_extension(&EntityId::Draft, EXTENSION_KEY)
            .unwrap()
            .unwrap();
        assert!(current.get("description").is_some());
    }

    #[test]
    fn test_legacy_object_shape_migrates() {
        let (store, backend) = store();
        let field = find_field("personality").unwrap();
        backend
            .write_extension(
                &EntityId::Draft,
                field.legacy_key,
                json!([{"title": "Grumpy", "description": "complains a lot"}]),
            )
            .unwrap();

        let variants = store.load(&EntityId::Draft, field).unwrap();
        assert_eq!(variants[0].title, "Grumpy");
        assert_eq!(variants[0].content, "complains a lot");
    }

    #[test]
    fn test_current_schema_wins_over_legacy() {
        let (store, backend) = store();
        let field = find_field("description").unwrap();
        store
            .save(&EntityId::Draft, field, &[Variant::numbered("Description", 1, "new")])
            .unwrap();
        backend
            .write_extension(&EntityId::Draft, field.legacy_key, json!(["stale"]))
            .unwrap();

        let variants = store.load(&EntityId::Draft, field).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].content, "new");
    }

    #[test]
    fn test_fields_do_not_clobber_each_other() {
        let (store, _) = store();
        let desc = find_field("description").unwrap();
        let pers = find_field("personality").unwrap();
        store
            .save(&EntityId::Draft, desc, &[Variant::numbered("Description", 1, "d")])
            .unwrap();
        store
            .save(&EntityId::Draft, pers, &[Variant::numbered("Personality", 1, "p")])
            .unwrap();

        assert_eq!(store.load(&EntityId::Draft, desc).unwrap()[0].content, "d");
        assert_eq!(store.load(&EntityId::Draft, pers).unwrap()[0].content, "p");
    }
}
