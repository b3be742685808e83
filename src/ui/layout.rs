//! Layout management for the TUI.

use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// UI layout areas.
pub struct Layout {
    /// Status bar area (top).
    pub status_area: Rect,
    /// Configuration form (left).
    pub form_area: Rect,
    /// Log panel (top right).
    pub log_area: Rect,
    /// Sentiment chart (bottom right).
    pub chart_area: Rect,
    /// Input line for field edits and engine prompts.
    pub prompt_area: Rect,
    /// Key hint line (bottom), empty when hidden.
    pub help_area: Rect,
    /// Notification area (overlaid).
    pub notification_area: Rect,
}

impl Layout {
    /// Create a new layout from the terminal area.
    pub fn new(area: Rect, show_help_bar: bool) -> Self {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                        // Status bar
                Constraint::Min(0),                           // Main content
                Constraint::Length(3),                        // Prompt bar
                Constraint::Length(u16::from(show_help_bar)), // Help bar
            ])
            .split(area);

        let columns = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        let right = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        // Notification area is centered over the main area
        let notification_area = Rect {
            x: area.x + area.width / 4,
            y: area.y + (area.height / 2).saturating_sub(2),
            width: area.width / 2,
            height: 4.min(area.height),
        };

        Self {
            status_area: chunks[0],
            form_area: columns[0],
            log_area: right[0],
            chart_area: right[1],
            prompt_area: chunks[2],
            help_area: chunks[3],
            notification_area,
        }
    }
}

/// Create a centered popup area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
