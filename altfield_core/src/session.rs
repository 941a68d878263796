//! Panel session: one open popup editing the variants of one (entity, field).
//!
//! The session's in-memory array is the single source of truth while the
//! panel is open. Add and delete persist immediately; title/content edits
//! update memory at once and reach the store through the write debouncer.
//! Status is re-derived (never stored) after a short settle delay whenever
//! the live editor text changes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::debounce::Debouncer;
use crate::field_config::FieldConfig;
use crate::host::{HostEditor, TokenCounter};
use crate::reconcile::{field_status, match_index, FieldStatus};
use crate::store::{EntityId, StoreError, VariantStore};
use crate::variant::Variant;
use crate::view::{render_panel, PanelView};

/// Delay before re-deriving status after a live-field event, so rapid
/// keystrokes collapse into one recompute.
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);
/// Delay before a variant edit is written through to the store.
pub const WRITE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no variant at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Emitted on the session's event channel for the host UI to react to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Live text settled (or the list changed); status was re-derived.
    StatusChanged { status: FieldStatus },
    /// A debounced edit reached the store.
    Persisted { index: usize },
    /// A token count resolved for one list item.
    TokenCount { index: usize, tokens: usize },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UseOutcome {
    /// The live field has unsaved edits; the host must confirm the overwrite.
    NeedsConfirmation,
    Switched,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Deletion must be confirmed first; nothing was changed.
    NeedsConfirmation { title: String },
    Deleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub index: usize,
    /// The same content already exists in the list. Allowed, but the UI warns.
    pub duplicate: bool,
}

struct SessionState {
    variants: Vec<Variant>,
    live_text: String,
}

pub struct PanelSession {
    field: &'static FieldConfig,
    entity: EntityId,
    entity_name: String,
    store: VariantStore,
    editor: Arc<dyn HostEditor>,
    tokens: Arc<dyn TokenCounter>,
    state: Arc<Mutex<SessionState>>,
    writes: Debouncer,
    settle: Debouncer,
    events: UnboundedSender<SessionEvent>,
}

impl PanelSession {
    /// Opens a panel for one (entity, field) pair: loads the stored list
    /// (running legacy migration if needed) and, on a first open with text
    /// already in the editor, seeds variant #1 from that text.
    pub fn open(
        field: &'static FieldConfig,
        entity: EntityId,
        entity_name: String,
        store: VariantStore,
        editor: Arc<dyn HostEditor>,
        tokens: Arc<dyn TokenCounter>,
    ) -> Result<(Self, UnboundedReceiver<SessionEvent>), SessionError> {
        let live_text = editor.field_text(field);
        let mut variants = store.load(&entity, field)?;

        if variants.is_empty() && !live_text.trim().is_empty() {
            variants.push(Variant::numbered(field.label, 1, &live_text));
            store.save(&entity, field, &variants)?;
        }

        let (events, receiver) = unbounded_channel();
        let session = Self {
            field,
            entity,
            entity_name,
            store,
            editor,
            tokens,
            state: Arc::new(Mutex::new(SessionState { variants, live_text })),
            writes: Debouncer::new(WRITE_DELAY),
            settle: Debouncer::new(SETTLE_DELAY),
            events,
        };
        Ok((session, receiver))
    }

    pub fn field(&self) -> &'static FieldConfig {
        self.field
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn variants(&self) -> Vec<Variant> {
        self.state.lock().unwrap().variants.clone()
    }

    pub fn status(&self) -> FieldStatus {
        let state = self.state.lock().unwrap();
        field_status(&state.variants, &state.live_text)
    }

    /// Rebuilds the whole view and kicks off a token count per item.
    pub fn render(&self) -> PanelView {
        let view = {
            let state = self.state.lock().unwrap();
            render_panel(self.field, &self.entity_name, &state.variants, &state.live_text)
        };
        for item in &view.items {
            self.spawn_token_count(item.index, item.content.clone());
        }
        view
    }

    /// Appends the current live text as a new variant (or a blank row when
    /// the editor is empty) and persists immediately.
    pub fn add_variant(&self) -> Result<AddOutcome, SessionError> {
        let (snapshot, outcome) = {
            let mut state = self.state.lock().unwrap();
            let live = state.live_text.clone();
            let duplicate =
                !live.trim().is_empty() && match_index(&state.variants, &live).is_some();
            let variant = if live.trim().is_empty() {
                Variant {
                    title: String::new(),
                    content: String::new(),
                }
            } else {
                Variant::numbered(self.field.label, state.variants.len() + 1, &live)
            };
            state.variants.push(variant);
            let outcome = AddOutcome {
                index: state.variants.len() - 1,
                duplicate,
            };
            (state.variants.clone(), outcome)
        };
        self.store.save(&self.entity, self.field, &snapshot)?;
        self.emit_status();
        Ok(outcome)
    }

    /// Copies a variant's content into the live editor field. If the live
    /// text has unsaved edits and the caller has not confirmed yet, nothing
    /// happens and `NeedsConfirmation` is returned.
    pub fn use_variant(&self, index: usize, confirmed: bool) -> Result<UseOutcome, SessionError> {
        let content = {
            let state = self.state.lock().unwrap();
            let len = state.variants.len();
            let variant = state
                .variants
                .get(index)
                .ok_or(SessionError::IndexOutOfRange { index, len })?;
            let unsaved = matches!(
                field_status(&state.variants, &state.live_text),
                FieldStatus::Unsaved
            );
            if unsaved && !confirmed {
                return Ok(UseOutcome::NeedsConfirmation);
            }
            variant.content.clone()
        };

        self.editor.set_field_text(self.field, &content);
        self.state.lock().unwrap().live_text = content;
        self.emit_status();
        Ok(UseOutcome::Switched)
    }

    /// Removes a variant after confirmation; later indices shift down by one.
    /// Declining leaves the array untouched.
    pub fn delete_variant(
        &self,
        index: usize,
        confirmed: bool,
    ) -> Result<DeleteOutcome, SessionError> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let len = state.variants.len();
            if index >= len {
                return Err(SessionError::IndexOutOfRange { index, len });
            }
            if !confirmed {
                return Ok(DeleteOutcome::NeedsConfirmation {
                    title: state.variants[index].title.clone(),
                });
            }
            state.variants.remove(index);
            state.variants.clone()
        };
        self.store.save(&self.entity, self.field, &snapshot)?;
        self.emit_status();
        Ok(DeleteOutcome::Deleted)
    }

    /// Title edits update memory now and hit the store after the debounce.
    pub fn edit_title(&self, index: usize, text: &str) -> Result<(), SessionError> {
        self.apply_edit(index, |v| v.title = text.to_string())?;
        self.schedule_write(index, false);
        Ok(())
    }

    /// Content edits additionally re-derive status (the edited item may now
    /// match or stop matching the live text) and recount tokens on commit.
    pub fn edit_content(&self, index: usize, text: &str) -> Result<(), SessionError> {
        self.apply_edit(index, |v| v.content = text.to_string())?;
        self.schedule_write(index, true);
        self.schedule_settle();
        Ok(())
    }

    /// The host editor reports live typing or a paste.
    pub fn sync_live_text(&self, text: &str) {
        self.state.lock().unwrap().live_text = text.to_string();
        self.schedule_settle();
    }

    /// Detach: flush pending writes so nothing typed just before closing is
    /// lost, and stop the settle timer.
    pub fn close(&self) {
        self.settle.cancel("status");
        self.writes.flush_all();
    }

    fn apply_edit(
        &self,
        index: usize,
        apply: impl FnOnce(&mut Variant),
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        let len = state.variants.len();
        let variant = state
            .variants
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })?;
        apply(variant);
        Ok(())
    }

    fn schedule_write(&self, index: usize, recount: bool) {
        let state = Arc::clone(&self.state);
        let store = self.store.clone();
        let entity = self.entity.clone();
        let field = self.field;
        let events = self.events.clone();
        let tokens = Arc::clone(&self.tokens);
        let key = format!("{}:{}", self.field.field, index);

        self.writes.schedule(
            &key,
            Arc::new(move || {
                // Snapshot at commit time: the array may have changed since
                // the edit was scheduled, and the whole list is written.
                let (snapshot, content) = {
                    let state = state.lock().unwrap();
                    let content = state.variants.get(index).map(|v| v.content.clone());
                    (state.variants.clone(), content)
                };
                if store.save(&entity, field, &snapshot).is_ok() {
                    let _ = events.send(SessionEvent::Persisted { index });
                }
                if recount {
                    if let Some(content) = content {
                        let tokens = Arc::clone(&tokens);
                        let events = events.clone();
                        if let Ok(handle) = tokio::runtime::Handle::try_current() {
                            handle.spawn(async move {
                                let count = tokens.count(&content).await;
                                let _ = events.send(SessionEvent::TokenCount {
                                    index,
                                    tokens: count,
                                });
                            });
                        }
                    }
                }
            }),
        );
    }

    fn schedule_settle(&self) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        self.settle.schedule(
            "status",
            Arc::new(move || {
                let status = {
                    let state = state.lock().unwrap();
                    field_status(&state.variants, &state.live_text)
                };
                let _ = events.send(SessionEvent::StatusChanged { status });
            }),
        );
    }

    fn emit_status(&self) {
        let _ = self.events.send(SessionEvent::StatusChanged {
            status: self.status(),
        });
    }

    fn spawn_token_count(&self, index: usize, content: String) {
        let tokens = Arc::clone(&self.tokens);
        let events = self.events.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let count = tokens.count(&content).await;
                let _ = events.send(SessionEvent::TokenCount {
                    index,
                    tokens: count,
                });
            });
        }
    }
}
