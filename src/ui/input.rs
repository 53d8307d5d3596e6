//! Input field seam and the Enter-to-send key adapter.

use std::fmt::Debug;

/// The text box the user types into.
pub trait InputField: Send + Sync + Debug {
    /// Current contents.
    fn value(&self) -> String;

    /// Replace the contents.
    fn set_value(&self, value: &str);

    /// Enable or disable typing.
    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Move keyboard focus to the field.
    fn focus(&self);
}

/// Key identity as delivered by a key-event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Backspace,
    Other(String),
}

/// Modifier keys held during a press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// True when any modifier is held.
    #[must_use]
    pub fn any(self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A single key press with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// What the key source should do with a press after the adapter saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The press triggered a submit; its default action must be suppressed.
    Submit,
    /// Not ours; let the key do whatever it normally does.
    PassThrough,
}

impl KeyDisposition {
    #[must_use]
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Submit)
    }
}

impl KeyPress {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// A bare Enter press.
    #[must_use]
    pub fn enter() -> Self {
        Self::new(Key::Enter)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    /// Enter without any modifier submits; everything else passes through,
    /// so Shift+Enter still inserts a line break.
    #[must_use]
    pub fn disposition(&self) -> KeyDisposition {
        if self.key == Key::Enter && !self.modifiers.any() {
            KeyDisposition::Submit
        } else {
            KeyDisposition::PassThrough
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_enter_submits() {
        let press = KeyPress::enter();
        assert_eq!(press.disposition(), KeyDisposition::Submit);
        assert!(press.disposition().prevents_default());
    }

    #[test]
    fn test_shift_enter_passes_through() {
        let press = KeyPress::enter().with_shift();
        assert_eq!(press.disposition(), KeyDisposition::PassThrough);
        assert!(!press.disposition().prevents_default());
    }

    #[test]
    fn test_any_modifier_blocks_submit() {
        for modifiers in [
            Modifiers { ctrl: true, ..Modifiers::default() },
            Modifiers { alt: true, ..Modifiers::default() },
            Modifiers { meta: true, ..Modifiers::default() },
        ] {
            let press = KeyPress::enter().with_modifiers(modifiers);
            assert_eq!(press.disposition(), KeyDisposition::PassThrough);
        }
    }

    #[test]
    fn test_other_keys_pass_through() {
        assert_eq!(
            KeyPress::new(Key::Char('a')).disposition(),
            KeyDisposition::PassThrough
        );
        assert_eq!(
            KeyPress::new(Key::Other("Tab".into())).disposition(),
            KeyDisposition::PassThrough
        );
    }
}
