//! Event handler for processing input events.

use super::InputEvent;
use crate::config::KeyBindings;
use crate::error::Result;
use crate::state::{Action, InputMode, Store};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keybindings: KeyBindings,
    /// How long to wait for input before emitting a tick.
    tick_rate: Duration,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Copy, Default)]
struct StoreSnapshot {
    input_mode: InputMode,
    show_help: bool,
    prompt_pending: bool,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new(keybindings: KeyBindings, tick_rate: Duration) -> Self {
        Self {
            keybindings,
            tick_rate,
            store_snapshot: None,
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot {
            input_mode: store.app.input_mode,
            show_help: store.app.show_help,
            prompt_pending: store.pending_prompt().is_some(),
        });
    }

    /// Get the next action from user input, or a tick if none arrived.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        if event::poll(self.tick_rate)? {
            let event = event::read()?;
            return Ok(match event {
                CrosstermEvent::Key(key) => self.handle_key(key),
                CrosstermEvent::Mouse(mouse) => self.handle_mouse(mouse),
                // Terminal will automatically redraw
                _ => None,
            });
        }
        Ok(Some(Action::Tick))
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }

        let snapshot = self.store_snapshot.unwrap_or_default();
        match snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(key, snapshot),
            InputMode::Insert | InputMode::Prompt => self.handle_input_mode(key),
        }
    }

    /// Handle a mouse event and return an optional action.
    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollLogUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollLogDown),
            _ => None,
        }
    }

    fn handle_normal_mode(&self, key: KeyEvent, snapshot: StoreSnapshot) -> Option<Action> {
        let input = InputEvent::from(key);
        let keys = &self.keybindings;

        if snapshot.show_help {
            let closes = input.matches(&keys.help) || input.matches(&keys.back) || input.matches(&keys.quit);
            return closes.then_some(Action::ToggleHelp);
        }

        // Global shortcuts
        if input.matches(&keys.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&keys.help) {
            return Some(Action::ToggleHelp);
        }
        if input.matches(&keys.back) {
            return Some(Action::DismissNotification);
        }

        // Engine
        if input.matches(&keys.submit) {
            return Some(Action::Submit);
        }
        if input.matches(&keys.stop) {
            return Some(Action::StopEngine);
        }
        if snapshot.prompt_pending && key.code == KeyCode::Char('p') {
            return Some(Action::ResumePrompt);
        }

        // Form
        if input.matches(&keys.reset) {
            return Some(Action::ResetForm);
        }
        if input.matches(&keys.load_broker) {
            return Some(Action::LoadBrokerFile);
        }
        if input.matches(&keys.load_api) {
            return Some(Action::LoadApiFile);
        }
        if input.matches(&keys.load_tickers) {
            return Some(Action::LoadTickersFile);
        }
        if input.matches(&keys.clear_log) {
            return Some(Action::ClearLog);
        }

        // Navigation
        if input.matches(&keys.up) || matches!(key.code, KeyCode::Up | KeyCode::BackTab) {
            return Some(Action::PreviousField);
        }
        if input.matches(&keys.down) || matches!(key.code, KeyCode::Down | KeyCode::Tab) {
            return Some(Action::NextField);
        }
        if input.matches(&keys.left) || key.code == KeyCode::Left {
            return Some(Action::CycleField { forward: false });
        }
        if input.matches(&keys.right) || key.code == KeyCode::Right {
            return Some(Action::CycleField { forward: true });
        }
        if input.matches(&keys.select) || key.code == KeyCode::Char(' ') {
            return Some(Action::ActivateField);
        }

        match key.code {
            KeyCode::Home => Some(Action::FirstField),
            KeyCode::End => Some(Action::LastField),
            KeyCode::PageUp => Some(Action::PageLogUp),
            KeyCode::PageDown => Some(Action::PageLogDown),
            KeyCode::Char('g') => Some(Action::LogTop),
            KeyCode::Char('G') => Some(Action::LogBottom),
            _ => None,
        }
    }

    fn handle_input_mode(&self, key: KeyEvent) -> Option<Action> {
        let input = InputEvent::from(key);
        match key.code {
            KeyCode::Esc => Some(Action::CancelInput),
            KeyCode::Enter => Some(Action::CommitInput),
            KeyCode::Backspace => Some(Action::InputBackspace),
            KeyCode::Delete => Some(Action::InputDelete),
            KeyCode::Left => Some(Action::CursorLeft),
            KeyCode::Right => Some(Action::CursorRight),
            KeyCode::Home => Some(Action::CursorHome),
            KeyCode::End => Some(Action::CursorEnd),
            _ if input.ctrl() || input.alt() => None,
            _ => input.char().map(Action::InputChar),
        }
    }
}
