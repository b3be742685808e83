//! Key events and the binding strings of the `[keybindings]` settings table.
//!
//! A binding is a key name optionally prefixed by modifiers: `"s"` submits
//! the form, `"x"` stops the engine, `"b"`, `"a"` and `"t"` load the broker,
//! API and ticker files, `"Ctrl+r"` resets the form. Named keys (`Enter`,
//! `Esc`, `Tab`, `PageUp`, `F5`, `Space`, ...) are case-insensitive; a
//! lowercase letter also matches its capital so Caps Lock does not disable
//! the form shortcuts.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Simplified key representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Char('\0'),
        }
    }
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A processed input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers::from(event.modifiers),
        }
    }
}

impl InputEvent {
    /// Get the character if this is a character input.
    pub fn char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) => Some(c),
            _ => None,
        }
    }

    /// Check if Ctrl is held.
    pub fn ctrl(&self) -> bool {
        self.modifiers.ctrl
    }

    /// Check if Alt is held.
    pub fn alt(&self) -> bool {
        self.modifiers.alt
    }

    /// Check if this matches a key binding string (e.g., "Ctrl+r", "Enter").
    /// Strings that name no key never match.
    pub fn matches(&self, binding: &str) -> bool {
        KeyBinding::parse(binding).is_some_and(|binding| binding.matches(self))
    }
}

/// One parsed entry of the key bindings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    pub fn parse(binding: &str) -> Option<Self> {
        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in binding.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                name => key = Some(named_key(part, name)?),
            }
        }

        Some(Self {
            key: key?,
            modifiers,
        })
    }

    pub fn matches(&self, input: &InputEvent) -> bool {
        if input.modifiers.ctrl != self.modifiers.ctrl || input.modifiers.alt != self.modifiers.alt {
            return false;
        }

        match (self.key, input.key) {
            // Shift is implied by the character itself ("?", "G").
            (Key::Char(want), Key::Char(got)) if !self.modifiers.shift => {
                want == got || (want.is_ascii_lowercase() && want.to_ascii_uppercase() == got)
            }
            (Key::Char(want), Key::Char(got)) => {
                input.modifiers.shift && want.eq_ignore_ascii_case(&got)
            }
            (want, got) => want == got && input.modifiers.shift == self.modifiers.shift,
        }
    }
}

fn named_key(raw: &str, lower: &str) -> Option<Key> {
    let key = match lower {
        "enter" => Key::Enter,
        "esc" | "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "tab" => Key::Tab,
        "backtab" => Key::BackTab,
        "space" => Key::Char(' '),
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        _ => {
            let mut chars = raw.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c)),
                _ => lower.strip_prefix('f')?.parse().ok().map(Key::F),
            };
        }
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> InputEvent {
        InputEvent::from(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_plain_bindings() {
        assert!(key(KeyCode::Char('q'), KeyModifiers::NONE).matches("q"));
        assert!(key(KeyCode::Enter, KeyModifiers::NONE).matches("Enter"));
        assert!(key(KeyCode::Esc, KeyModifiers::NONE).matches("esc"));
        assert!(!key(KeyCode::Char('q'), KeyModifiers::CONTROL).matches("q"));
    }

    #[test]
    fn test_shifted_characters_match() {
        assert!(key(KeyCode::Char('?'), KeyModifiers::SHIFT).matches("?"));
        assert!(key(KeyCode::Char('S'), KeyModifiers::SHIFT).matches("s"));
        assert!(!key(KeyCode::Tab, KeyModifiers::SHIFT).matches("Tab"));
    }

    #[test]
    fn test_modifier_bindings() {
        assert!(key(KeyCode::Char('r'), KeyModifiers::CONTROL).matches("Ctrl+r"));
        assert!(!key(KeyCode::Char('r'), KeyModifiers::NONE).matches("Ctrl+r"));
        assert!(key(KeyCode::F(5), KeyModifiers::NONE).matches("F5"));
        assert!(key(KeyCode::Char('R'), KeyModifiers::SHIFT).matches("Shift+r"));
        assert!(!key(KeyCode::Char('r'), KeyModifiers::NONE).matches("Shift+r"));
    }

    #[test]
    fn test_default_form_bindings() {
        let keys = crate::config::KeyBindings::default();
        assert!(key(KeyCode::Char('s'), KeyModifiers::NONE).matches(&keys.submit));
        assert!(key(KeyCode::Char('b'), KeyModifiers::NONE).matches(&keys.load_broker));
        assert!(key(KeyCode::Char('r'), KeyModifiers::CONTROL).matches(&keys.reset));
        assert!(!key(KeyCode::Char('r'), KeyModifiers::NONE).matches(&keys.reset));
        assert!(!key(KeyCode::Char('x'), KeyModifiers::NONE).matches(&keys.submit));
    }

    #[test]
    fn test_parse_bindings() {
        assert_eq!(
            KeyBinding::parse("Ctrl+r"),
            Some(KeyBinding {
                key: Key::Char('r'),
                modifiers: Modifiers {
                    ctrl: true,
                    ..Modifiers::default()
                },
            })
        );
        assert_eq!(KeyBinding::parse("space").map(|b| b.key), Some(Key::Char(' ')));
        assert_eq!(KeyBinding::parse("F12").map(|b| b.key), Some(Key::F(12)));
        assert_eq!(KeyBinding::parse("f").map(|b| b.key), Some(Key::Char('f')));
        assert_eq!(KeyBinding::parse("Ctrl+"), None);
        assert_eq!(KeyBinding::parse("submit"), None);
        assert!(!key(KeyCode::Char('s'), KeyModifiers::NONE).matches("submit"));
    }

    #[test]
    fn test_capital_binding_needs_capital() {
        assert!(key(KeyCode::Char('G'), KeyModifiers::SHIFT).matches("G"));
        assert!(!key(KeyCode::Char('g'), KeyModifiers::NONE).matches("G"));
    }
}
