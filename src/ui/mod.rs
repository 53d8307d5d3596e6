//! Rendering seams and the widgets that draw through them.
//!
//! The session core never touches a concrete display. It renders through a
//! [`ChatSurface`] (the message area) and reads and toggles an
//! [`InputField`](input::InputField) (the text box). Two implementations ship:
//!
//! - [`memory`]: in-memory surface and input, used by tests and embedders
//! - [`terminal`]: line-oriented terminal rendering for the CLI front end
//!
//! # Structure
//!
//! - [`view`]: append-only message log ([`MessageView`])
//! - [`typing`]: animated "Typing" placeholder ([`TypingIndicator`])
//! - [`input`]: input field seam and key-press adapter

pub mod input;
pub mod memory;
pub mod terminal;
pub mod typing;
pub mod view;

pub use input::{InputField, Key, KeyDisposition, KeyPress, Modifiers};
pub use memory::{MemoryInput, MemorySurface};
pub use terminal::{TerminalInput, TerminalSurface};
pub use typing::TypingIndicator;
pub use view::MessageView;

use std::fmt::Debug;

use uuid::Uuid;

use crate::session::Sender;

/// Handle to one rendered entry on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Allocate a fresh entry handle.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a rendered entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A permanent log message.
    Message(Sender),
    /// The transient typing placeholder.
    Typing,
}

/// The message area of a chat widget.
///
/// Implementations are expected to keep entries in insertion order. All
/// methods take `&self`; implementations synchronize internally.
pub trait ChatSurface: Send + Sync + Debug {
    /// Append an entry to the end of the area and return its handle.
    fn append_entry(&self, kind: EntryKind, text: &str) -> EntryId;

    /// Replace the text of an existing entry. Unknown handles are ignored.
    fn update_entry(&self, id: EntryId, text: &str);

    /// Remove an entry. Returns `false` if the handle is unknown.
    fn remove_entry(&self, id: EntryId) -> bool;

    /// Bring the newest entry into view.
    fn scroll_to_end(&self);

    /// Show a one-line status outside the message log.
    fn set_status(&self, text: &str);
}
