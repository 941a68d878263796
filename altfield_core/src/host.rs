//! Capability traits the host application provides.
//!
//! The core never touches the host's UI or records directly; everything it
//! needs is injected through these traits (plus `ExtensionStore` in `store`).

use async_trait::async_trait;

use crate::field_config::FieldConfig;

/// Read and write the live editor field for the currently open entity.
pub trait HostEditor: Send + Sync {
    fn field_text(&self, field: &FieldConfig) -> String;
    /// Replaces the live value; the host is expected to refresh its editor UI.
    fn set_field_text(&self, field: &FieldConfig, text: &str);
}

/// Host token accounting. Counts resolve asynchronously and are patched into
/// the panel view through `SessionEvent::TokenCount` once available.
#[async_trait]
pub trait TokenCounter: Send + Sync {
    async fn count(&self, text: &str) -> usize;
}
