//! UI rendering using ratatui.
//!
//! This module contains all TUI components and rendering logic.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{FormPanel, HelpBar, HelpPanel, LogPanel, PromptBar, SentimentChart, StatusBar};

use crate::config::KeyBindings;
use crate::state::Store;
use ratatui::Frame;

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, keys: &KeyBindings) {
        let layout = Layout::new(frame.area(), store.app.show_help_bar);

        StatusBar::render(frame, layout.status_area, store);
        FormPanel::render(frame, layout.form_area, store);
        LogPanel::render(frame, layout.log_area, store);
        SentimentChart::render(frame, layout.chart_area, store);
        PromptBar::render(frame, layout.prompt_area, store);
        HelpBar::render(frame, layout.help_area, store.app.is_editing(), keys);

        // Render help panel if visible
        if store.app.show_help {
            HelpPanel::render(frame, frame.area(), keys);
        }

        // Render notification if present
        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }

        // Render error if present
        if let Some(error) = &store.app.error {
            widgets::render_error(frame, layout.notification_area, error);
        }
    }
}
