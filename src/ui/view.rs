//! Append-only message log.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ChatSurface, EntryKind};
use crate::session::{Message, Sender};

/// Ordered log of every message shown during a session.
///
/// Each [`append`](Self::append) renders the message on the surface and
/// scrolls it into view. Nothing is ever removed from the log.
#[derive(Debug)]
pub struct MessageView {
    surface: Arc<dyn ChatSurface>,
    log: Mutex<Vec<Message>>,
}

impl MessageView {
    #[must_use]
    pub fn new(surface: Arc<dyn ChatSurface>) -> Self {
        Self {
            surface,
            log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<Message>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message to the end of the log. Empty text is accepted.
    pub fn append(&self, text: impl Into<String>, sender: Sender) -> Message {
        let message = Message::new(text, sender);
        self.surface
            .append_entry(EntryKind::Message(sender), message.text());
        self.surface.scroll_to_end();
        self.log().push(message.clone());
        message
    }

    /// Snapshot of the log in insertion order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.log().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.log().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }

    /// The surface this view renders to.
    #[must_use]
    pub fn surface(&self) -> &Arc<dyn ChatSurface> {
        &self.surface
    }
}
