//! altfield_core - alternate text variants for character editor fields
//!
//! Modules:
//! - field_config: static descriptors for the editable fields
//! - variant: the stored variant shape across schema generations
//! - store: variant persistence over host extension data, with migration
//! - reconcile: live-text vs saved-list status derivation
//! - view: panel view models, rebuilt from scratch per render
//! - debounce: per-key cancellable write scheduling
//! - session: one open panel (list CRUD, debounced persistence, events)
//! - command: the `altfield` command engine
//! - host: capability traits the host application provides

pub mod command;
pub mod debounce;
pub mod field_config;
pub mod host;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod variant;
pub mod view;

// Re-export key types for convenience
pub use command::{execute as execute_command, AltFieldCommand, CommandError};

pub use debounce::Debouncer;

pub use field_config::{find_field, FieldConfig, EXTENSION_KEY, FIELD_CONFIGS};

pub use host::{HostEditor, TokenCounter};

pub use reconcile::{field_status, match_index, FieldStatus};

pub use session::{
    AddOutcome, DeleteOutcome, PanelSession, SessionError, SessionEvent, UseOutcome,
    SETTLE_DELAY, WRITE_DELAY,
};

pub use store::{DraftStore, EntityId, ExtensionStore, StoreError, VariantStore};

pub use variant::Variant;

pub use view::{PanelView, StatusView, VariantItemView};
