//! Input line for field edits and engine prompts.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::form::FieldKind;
use crate::state::{InputMode, Store};

/// Bottom input bar.
pub struct PromptBar;

impl PromptBar {
    /// Render the prompt bar, placing the cursor when editing.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let (title, color) = match store.app.input_mode {
            InputMode::Insert => (format!(" Edit {} ", store.form.selected().label()), Color::Yellow),
            InputMode::Prompt => (
                format!(" Engine: {} ", store.pending_prompt().unwrap_or_default()),
                Color::Magenta,
            ),
            InputMode::Normal => (" Input ".to_string(), Color::DarkGray),
        };

        let content = match store.app.input_mode {
            InputMode::Normal => match store.pending_prompt() {
                Some(question) => Line::from(vec![
                    Span::styled(
                        "Engine is waiting: ",
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(question),
                    Span::styled("  (p to answer)", Style::default().fg(Color::DarkGray)),
                ]),
                None => Line::from(Span::styled(
                    "Enter edits the selected field, s submits",
                    Style::default().fg(Color::DarkGray),
                )),
            },
            InputMode::Insert if store.form.selected().kind() == FieldKind::Secret => {
                Line::from("•".repeat(store.app.input_buffer.chars().count()))
            }
            _ => Line::from(store.app.input_buffer.as_str()),
        };

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(paragraph, area);

        if store.app.is_editing() {
            let max_x = area.width.saturating_sub(2);
            let x = area.x + 1 + (store.app.cursor_position as u16).min(max_x);
            frame.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
}
