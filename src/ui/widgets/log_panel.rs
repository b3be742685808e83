//! Log panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::engine::{LogLevel, LogLine};
use crate::state::Store;

/// Scrolling log of engine and application messages.
pub struct LogPanel;

impl LogPanel {
    /// Render the log panel.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let height = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = store.log.visible(height).map(log_line).collect();

        let title = if store.log.is_following() {
            format!(" Log ({}) ", store.log.len())
        } else {
            format!(" Log ({}) [scrolled, G for latest] ", store.log.len())
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(paragraph, area);
    }
}

fn log_line(line: &LogLine) -> Line<'_> {
    let color = match line.level {
        LogLevel::Debug => Color::DarkGray,
        LogLevel::Info => Color::White,
        LogLevel::Warning => Color::Yellow,
        LogLevel::Error => Color::Red,
    };

    Line::from(vec![
        Span::styled(
            line.timestamp.format("%H:%M:%S ").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:<7} ", line.level.as_str()), Style::default().fg(color)),
        Span::styled(line.message.as_str(), Style::default().fg(color)),
    ])
}
