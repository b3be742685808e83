//! Notification rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::state::{Notification, NotificationLevel};

/// Render a notification popup.
pub fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let (color, icon) = match notification.level {
        NotificationLevel::Info => (Color::Cyan, "ℹ "),
        NotificationLevel::Success => (Color::Green, "✓ "),
        NotificationLevel::Warning => (Color::Yellow, "⚠ "),
        NotificationLevel::Error => (Color::Red, "✗ "),
    };

    popup(
        frame,
        area,
        color,
        Line::from(vec![
            Span::styled(icon, Style::default().fg(color)),
            Span::raw(notification.message.as_str()),
        ]),
    );
}

/// Render an error popup.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    popup(
        frame,
        area,
        Color::Red,
        Line::from(vec![
            Span::styled(
                "✗ Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(error),
        ]),
    );
}

fn popup(frame: &mut Frame, area: Rect, color: Color, content: Line) {
    frame.render_widget(Clear, area);

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}
