//! Application-level state.

use super::Notification;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Editing the selected form field.
    Insert,
    /// Answering a question from the engine.
    Prompt,
}

/// What the engine is doing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Idle,
    Running {
        session: Uuid,
        account: String,
        symbols: usize,
        since: DateTime<Local>,
    },
}

impl EngineStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current input mode.
    pub input_mode: InputMode,
    /// Engine session status.
    pub engine: EngineStatus,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Whether to show the key hint bar.
    pub show_help_bar: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// Current error message.
    pub error: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Text being typed into a field or prompt.
    pub input_buffer: String,
    /// Cursor position in input buffer, in characters.
    pub cursor_position: usize,
}

impl AppState {
    /// Create a new application state.
    pub fn new() -> Self {
        Self {
            show_help_bar: true,
            ..Default::default()
        }
    }

    /// Check if in an input mode.
    pub fn is_editing(&self) -> bool {
        matches!(self.input_mode, InputMode::Insert | InputMode::Prompt)
    }

    /// Start editing with the given text and the cursor at its end.
    pub fn begin_input(&mut self, mode: InputMode, text: &str) {
        self.input_mode = mode;
        self.input_buffer = text.to_string();
        self.cursor_position = text.chars().count();
    }

    /// Leave input mode, returning what was typed.
    pub fn take_input(&mut self) -> String {
        self.input_mode = InputMode::Normal;
        self.cursor_position = 0;
        std::mem::take(&mut self.input_buffer)
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input_buffer
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len())
    }

    /// Add a character at the cursor.
    pub fn push_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.input_buffer.insert(at, c);
        self.cursor_position += 1;
    }

    /// Remove the character before the cursor.
    pub fn pop_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.input_buffer.remove(at);
        }
    }

    /// Remove the character under the cursor.
    pub fn delete_char(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            let at = self.byte_index(self.cursor_position);
            self.input_buffer.remove(at);
        }
    }

    /// Move cursor left.
    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn cursor_right(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_is_char_aware() {
        let mut app = AppState::new();
        app.begin_input(InputMode::Insert, "€1");
        assert_eq!(app.cursor_position, 2);

        app.cursor_left();
        app.push_char('x');
        assert_eq!(app.input_buffer, "€x1");

        app.cursor_home();
        app.delete_char();
        assert_eq!(app.input_buffer, "x1");

        app.cursor_end();
        app.pop_char();
        assert_eq!(app.input_buffer, "x");
        assert_eq!(app.take_input(), "x");
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.input_buffer.is_empty());
    }
}
