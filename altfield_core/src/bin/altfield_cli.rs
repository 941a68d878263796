/*!
 * AltField CLI - Character Card Variant Tool
 *
 * Operates on exported character card JSON files: lists a field's saved
 * variants, migrates legacy variant storage to the current schema, and
 * switches a field to a named or random variant.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use altfield_core::{
    execute_command, find_field, AltFieldCommand, EntityId, ExtensionStore, FieldConfig,
    HostEditor, StoreError, VariantStore, FIELD_CONFIGS,
};

#[derive(Parser)]
#[command(name = "altfield_cli")]
#[command(about = "AltField - character card variant inspector and switcher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a field's saved variants (legacy storage is migrated on the way)
    List {
        /// Character card JSON file
        #[arg(short, long)]
        card: PathBuf,

        /// Field name (description, personality, scenario, first_message)
        #[arg(short, long)]
        field: String,
    },

    /// Rewrite legacy variant storage to the current schema
    Migrate {
        /// Character card JSON file
        #[arg(short, long)]
        card: PathBuf,
    },

    /// Switch a field to a saved variant and print the new content
    Use {
        /// Character card JSON file
        #[arg(short, long)]
        card: PathBuf,

        /// Field name
        #[arg(short, long)]
        field: String,

        /// Variant title; a random variant is picked when omitted
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { card, field } => {
            if let Err(e) = run_list(&card, &field) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Migrate { card } => {
            if let Err(e) = run_migrate(&card) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Use { card, field, name } => {
            if let Err(e) = run_use(&card, &field, name) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("altfield_cli v{}", env!("CARGO_PKG_VERSION"));
            println!("AltField character card variant tool");
        }
    }
}

/// A character card held in memory while a command runs against it. Doubles
/// as the extension backend and the "live editor" for the command engine.
struct CardFile {
    card: Mutex<Value>,
}

impl CardFile {
    fn read(path: &Path) -> Result<Arc<Self>> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let card: Value =
            serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        if !card.is_object() {
            bail!("card is not a JSON object: {}", path.display());
        }
        Ok(Arc::new(Self {
            card: Mutex::new(card),
        }))
    }

    fn write(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(&*self.card.lock().unwrap())?;
        fs::write(path, data).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn entity(&self) -> EntityId {
        let name = self
            .card
            .lock()
            .unwrap()
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("card")
            .to_string();
        EntityId::Saved(name)
    }
}

impl ExtensionStore for CardFile {
    fn read_extension(&self, _entity: &EntityId, key: &str) -> Result<Option<Value>, StoreError> {
        let card = self.card.lock().unwrap();
        Ok(card.get("extensions").and_then(|e| e.get(key)).cloned())
    }

    fn write_extension(&self, _entity: &EntityId, key: &str, value: Value) -> Result<(), StoreError> {
        let mut card = self.card.lock().unwrap();
        let obj = card
            .as_object_mut()
            .ok_or_else(|| StoreError::Backend("card is not an object".to_string()))?;
        let extensions = obj
            .entry("extensions")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        match extensions.as_object_mut() {
            Some(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
            None => Err(StoreError::Backend("extensions is not an object".to_string())),
        }
    }

    fn delete_extension(&self, _entity: &EntityId, key: &str) -> Result<(), StoreError> {
        let mut card = self.card.lock().unwrap();
        if let Some(extensions) = card.get_mut("extensions").and_then(|e| e.as_object_mut()) {
            extensions.remove(key);
        }
        Ok(())
    }
}

impl HostEditor for CardFile {
    fn field_text(&self, field: &FieldConfig) -> String {
        self.card
            .lock()
            .unwrap()
            .get(field.field)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    fn set_field_text(&self, field: &FieldConfig, text: &str) {
        let mut card = self.card.lock().unwrap();
        if let Some(obj) = card.as_object_mut() {
            obj.insert(field.field.to_string(), Value::String(text.to_string()));
        }
    }
}

fn run_list(path: &Path, field_name: &str) -> Result<()> {
    let card = CardFile::read(path)?;
    let field = find_field(field_name).ok_or_else(|| anyhow!("unknown field: {}", field_name))?;
    let store = VariantStore::new(card.clone() as Arc<dyn ExtensionStore>);
    let entity = card.entity();

    let variants = store.load(&entity, field)?;
    if variants.is_empty() {
        println!("No saved variants for {}", field.field);
    } else {
        let live = card.field_text(field);
        for (i, v) in variants.iter().enumerate() {
            let marker = if v.content.trim() == live.trim() {
                " (active)"
            } else {
                ""
            };
            println!("[{}] {}{}", i, v.title, marker);
        }
    }

    // Loading may have migrated legacy storage; write the card back.
    card.write(path)
}

fn run_migrate(path: &Path) -> Result<()> {
    let card = CardFile::read(path)?;
    let store = VariantStore::new(card.clone() as Arc<dyn ExtensionStore>);
    let entity = card.entity();

    let mut migrated = 0;
    for field in FIELD_CONFIGS {
        let had_legacy = card.read_extension(&entity, field.legacy_key)?.is_some();
        store.load(&entity, field)?;
        let still_legacy = card.read_extension(&entity, field.legacy_key)?.is_some();
        if had_legacy && !still_legacy {
            println!("Migrated {}", field.legacy_key);
            migrated += 1;
        }
    }
    if migrated == 0 {
        println!("Nothing to migrate");
    }

    card.write(path)
}

fn run_use(path: &Path, field_name: &str, name: Option<String>) -> Result<()> {
    let card = CardFile::read(path)?;
    let store = VariantStore::new(card.clone() as Arc<dyn ExtensionStore>);
    let editor = card.clone() as Arc<dyn HostEditor>;
    let entity = card.entity();

    let cmd = AltFieldCommand {
        field: field_name.to_string(),
        name,
    };
    let content = execute_command(&cmd, &entity, &store, &editor)?;
    card.write(path)?;

    println!("{}", content);
    Ok(())
}
