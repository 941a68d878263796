//! The `altfield` command: switch a field to a named (or random) variant.
//!
//! `altfield field=description name="Backup copy"` replaces the live
//! description with the named variant's content and returns it. Omitting
//! `name` picks a random variant. Errors are descriptive values; the host
//! boundary turns them into strings rather than letting anything propagate.

use std::sync::Arc;

use rand::Rng;
use regex::Regex;
use thiserror::Error;

use crate::field_config::find_field;
use crate::host::HostEditor;
use crate::store::{EntityId, StoreError, VariantStore};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("expected key=value arguments, got unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing required argument: field")]
    MissingField,
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("no saved variants for field: {0}")]
    NoVariants(String),
    #[error("no variant named '{name}' for field: {field}")]
    UnknownVariant { field: String, name: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltFieldCommand {
    pub field: String,
    pub name: Option<String>,
}

impl AltFieldCommand {
    /// Parses `field=<name> name=<variant title>`. Values may be quoted to
    /// include spaces; argument order does not matter.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let arg_re = Regex::new(r#"(\w+)=(?:"([^"]*)"|(\S+))"#).unwrap();

        let mut field = None;
        let mut name = None;
        for caps in arg_re.captures_iter(input) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            match &caps[1] {
                "field" => field = Some(value),
                "name" => name = Some(value),
                other => return Err(CommandError::UnknownArgument(other.to_string())),
            }
        }

        let field = field.ok_or(CommandError::MissingField)?;
        Ok(Self { field, name })
    }
}

/// Runs a parsed command against an entity's stored variants, writing the
/// selected content into the live field. Returns the new content.
pub fn execute(
    cmd: &AltFieldCommand,
    entity: &EntityId,
    store: &VariantStore,
    editor: &Arc<dyn HostEditor>,
) -> Result<String, CommandError> {
    let field =
        find_field(&cmd.field).ok_or_else(|| CommandError::UnknownField(cmd.field.clone()))?;

    let variants = store.load(entity, field)?;
    if variants.is_empty() {
        return Err(CommandError::NoVariants(field.field.to_string()));
    }

    let variant = match &cmd.name {
        Some(name) => variants
            .iter()
            .find(|v| v.title.eq_ignore_ascii_case(name))
            .ok_or_else(|| CommandError::UnknownVariant {
                field: field.field.to_string(),
                name: name.clone(),
            })?,
        None => {
            let pick = rand::thread_rng().gen_range(0..variants.len());
            &variants[pick]
        }
    };

    editor.set_field_text(field, &variant.content);
    Ok(variant.content.clone())
}
