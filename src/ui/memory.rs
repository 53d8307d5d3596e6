//! In-memory surface and input field.
//!
//! Both types are cheap handles over shared state, so a test can keep one
//! clone for inspection while the controller owns another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ChatSurface, EntryId, EntryKind, InputField};

/// One entry as currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub text: String,
}

#[derive(Debug, Default)]
struct SurfaceState {
    entries: Vec<RenderedEntry>,
    status: Option<String>,
    scrolls: usize,
}

/// Surface that keeps rendered entries in a vector.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every entry in display order.
    #[must_use]
    pub fn entries(&self) -> Vec<RenderedEntry> {
        self.state().entries.clone()
    }

    /// Texts of every entry in display order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.state().entries.iter().map(|e| e.text.clone()).collect()
    }

    /// Text of the typing placeholder, if one is rendered.
    #[must_use]
    pub fn typing_text(&self) -> Option<String> {
        self.state()
            .entries
            .iter()
            .find(|e| e.kind == EntryKind::Typing)
            .map(|e| e.text.clone())
    }

    #[must_use]
    pub fn status(&self) -> Option<String> {
        self.state().status.clone()
    }

    /// Number of scroll-to-end requests received so far.
    #[must_use]
    pub fn scroll_count(&self) -> usize {
        self.state().scrolls
    }
}

impl ChatSurface for MemorySurface {
    fn append_entry(&self, kind: EntryKind, text: &str) -> EntryId {
        let id = EntryId::new();
        self.state().entries.push(RenderedEntry {
            id,
            kind,
            text: text.to_string(),
        });
        id
    }

    fn update_entry(&self, id: EntryId, text: &str) {
        if let Some(entry) = self.state().entries.iter_mut().find(|e| e.id == id) {
            entry.text = text.to_string();
        }
    }

    fn remove_entry(&self, id: EntryId) -> bool {
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        state.entries.len() != before
    }

    fn scroll_to_end(&self) {
        self.state().scrolls += 1;
    }

    fn set_status(&self, text: &str) {
        self.state().status = Some(text.to_string());
    }
}

#[derive(Debug)]
struct InputState {
    value: String,
    enabled: bool,
    focus_count: usize,
}

/// Input field backed by shared memory.
#[derive(Debug, Clone)]
pub struct MemoryInput {
    inner: Arc<Mutex<InputState>>,
}

impl Default for MemoryInput {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInput {
    /// An empty, enabled input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(InputState {
                value: String::new(),
                enabled: true,
                focus_count: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, InputState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// How many times focus was requested.
    #[must_use]
    pub fn focus_count(&self) -> usize {
        self.state().focus_count
    }
}

impl InputField for MemoryInput {
    fn value(&self) -> String {
        self.state().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.state().value = value.to_string();
    }

    fn set_enabled(&self, enabled: bool) {
        self.state().enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    fn focus(&self) {
        self.state().focus_count += 1;
    }
}
