//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{EngineStatus, InputMode, Store};

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let engine_status = match &store.app.engine {
            EngineStatus::Idle => Span::styled("○ Idle", Style::default().fg(Color::Red)),
            EngineStatus::Running {
                account,
                symbols,
                since,
                ..
            } => Span::styled(
                format!(
                    "● Running {account}, {symbols} symbol(s) since {}",
                    since.format("%H:%M")
                ),
                Style::default().fg(Color::Green),
            ),
        };

        let mode = match store.app.input_mode {
            InputMode::Normal => None,
            InputMode::Insert => Some(" EDIT "),
            InputMode::Prompt => Some(" PROMPT "),
        }
        .map(|m| Span::styled(m, Style::default().fg(Color::Yellow)))
        .unwrap_or_else(|| Span::raw(""));

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::Gray));

        // Create the status line
        let left_content = vec![
            Span::styled(
                " Strader ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            engine_status,
            Span::raw(" | "),
            mode,
        ];

        let status_line = Line::from(left_content);

        // Calculate padding for right-aligned help hint
        let left_len = status_line.width();
        let right_len = help_hint.width();
        let padding = (area.width as usize).saturating_sub(left_len + right_len);

        let mut full_line = status_line.spans;
        full_line.push(Span::raw(" ".repeat(padding)));
        full_line.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(full_line)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}
