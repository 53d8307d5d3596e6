//! Line-oriented terminal rendering.
//!
//! A terminal cannot edit arbitrary earlier lines, so the typing placeholder
//! is always kept as the last, unterminated line and redrawn in place with a
//! carriage return. Permanent messages are printed as `Label: text` lines.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{ChatSurface, EntryId, EntryKind, InputField};

const CLEAR_LINE: &str = "\r\x1b[2K";
const PROMPT: &str = "> ";

#[derive(Debug)]
struct TerminalState<W> {
    out: W,
    /// The live placeholder line, if any.
    pending: Option<(EntryId, String)>,
}

/// Surface that writes to a terminal-like sink.
#[derive(Debug)]
pub struct TerminalSurface<W: Write + Send = Stdout> {
    state: Mutex<TerminalState<W>>,
}

impl TerminalSurface<Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(TerminalState { out, pending: None }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TerminalState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, render: impl FnOnce(&mut TerminalState<W>) -> io::Result<()>) {
        let mut state = self.state();
        if let Err(err) = render(&mut state).and_then(|()| state.out.flush()) {
            debug!(name: "terminal.write.failed", error = %err, "Terminal write failed");
        }
    }

    /// Print the input prompt.
    pub fn prompt(&self) {
        self.emit(|state| {
            if state.pending.is_none() {
                write!(state.out, "{PROMPT}")?;
            }
            Ok(())
        });
    }
}

impl<W: Write + Send + std::fmt::Debug> ChatSurface for TerminalSurface<W> {
    fn append_entry(&self, kind: EntryKind, text: &str) -> EntryId {
        let id = EntryId::new();
        self.emit(|state| {
            match kind {
                EntryKind::Typing => {
                    write!(state.out, "{CLEAR_LINE}{text}")?;
                    state.pending = Some((id, text.to_string()));
                }
                EntryKind::Message(sender) => {
                    writeln!(state.out, "{CLEAR_LINE}{}: {text}", sender.label())?;
                    if let Some((_, live)) = &state.pending {
                        write!(state.out, "{live}")?;
                    }
                }
            }
            Ok(())
        });
        id
    }

    fn update_entry(&self, id: EntryId, text: &str) {
        self.emit(|state| {
            if let Some((live_id, live)) = &mut state.pending {
                if *live_id == id {
                    *live = text.to_string();
                    write!(state.out, "{CLEAR_LINE}{text}")?;
                }
            }
            Ok(())
        });
    }

    fn remove_entry(&self, id: EntryId) -> bool {
        let mut removed = false;
        self.emit(|state| {
            if state.pending.as_ref().is_some_and(|(live_id, _)| *live_id == id) {
                state.pending = None;
                removed = true;
                write!(state.out, "{CLEAR_LINE}")?;
            }
            Ok(())
        });
        removed
    }

    fn scroll_to_end(&self) {
        self.emit(|_| Ok(()));
    }

    fn set_status(&self, text: &str) {
        self.emit(|state| {
            writeln!(state.out, "{CLEAR_LINE}  [{text}]")?;
            if let Some((_, live)) = &state.pending {
                write!(state.out, "{live}")?;
            }
            Ok(())
        });
    }
}

#[derive(Debug, Default)]
struct TerminalInputState {
    value: String,
    disabled: bool,
}

/// Input field for the terminal front end.
///
/// The line itself is typed into the terminal; this type tracks the last
/// submitted line and whether input is currently accepted. Focus redraws the
/// prompt.
#[derive(Debug)]
pub struct TerminalInput<W: Write + Send = Stdout> {
    surface: Arc<TerminalSurface<W>>,
    state: Mutex<TerminalInputState>,
}

impl<W: Write + Send> TerminalInput<W> {
    #[must_use]
    pub fn new(surface: Arc<TerminalSurface<W>>) -> Self {
        Self {
            surface,
            state: Mutex::new(TerminalInputState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TerminalInputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send + std::fmt::Debug> InputField for TerminalInput<W> {
    fn value(&self) -> String {
        self.state().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.state().value = value.to_string();
    }

    fn set_enabled(&self, enabled: bool) {
        self.state().disabled = !enabled;
    }

    fn is_enabled(&self) -> bool {
        !self.state().disabled
    }

    fn focus(&self) {
        if self.is_enabled() {
            self.surface.prompt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Sender;

    #[derive(Debug, Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_messages_are_labeled_lines() {
        let buffer = Buffer::default();
        let surface = TerminalSurface::new(buffer.clone());

        surface.append_entry(EntryKind::Message(Sender::User), "hello");
        surface.append_entry(EntryKind::Message(Sender::Bot), "Hi!");

        let out = buffer.contents();
        assert!(out.contains("You: hello\n"));
        assert!(out.contains("Bot: Hi!\n"));
    }

    #[test]
    fn test_placeholder_redrawn_in_place() {
        let buffer = Buffer::default();
        let surface = TerminalSurface::new(buffer.clone());

        let id = surface.append_entry(EntryKind::Typing, "Typing");
        surface.update_entry(id, "Typing.");
        assert!(buffer.contents().ends_with(&format!("{CLEAR_LINE}Typing.")));

        assert!(surface.remove_entry(id));
        assert!(!surface.remove_entry(id));
        assert!(buffer.contents().ends_with(CLEAR_LINE));
    }

    #[test]
    fn test_prompt_follows_enabled_focus() {
        let buffer = Buffer::default();
        let surface = Arc::new(TerminalSurface::new(buffer.clone()));
        let input = TerminalInput::new(Arc::clone(&surface));

        input.set_enabled(false);
        input.focus();
        assert!(buffer.contents().is_empty());

        input.set_enabled(true);
        input.focus();
        assert_eq!(buffer.contents(), PROMPT);
    }
}
