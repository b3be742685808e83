//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::config::KeyBindings;

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let sections: [(&str, Vec<(String, &str)>); 4] = [
            (
                "Form",
                vec![
                    (format!("{}/{}/Tab", keys.down, keys.up), "Next / previous field"),
                    (keys.select.clone(), "Edit, toggle or cycle field"),
                    (format!("{}/{}", keys.left, keys.right), "Previous / next option"),
                    ("Home/End".to_string(), "First / last field"),
                    (keys.reset.clone(), "Reset form to defaults"),
                ],
            ),
            (
                "Files",
                vec![
                    (keys.load_broker.clone(), "Load broker credentials file"),
                    (keys.load_api.clone(), "Load API keys file"),
                    (keys.load_tickers.clone(), "Load tickers file"),
                ],
            ),
            (
                "Engine",
                vec![
                    (keys.submit.clone(), "Validate and start (restarts if running)"),
                    (keys.stop.clone(), "Stop the engine"),
                    ("p".to_string(), "Answer a pending engine prompt"),
                ],
            ),
            (
                "Log",
                vec![
                    ("PgUp/PgDn".to_string(), "Scroll log"),
                    ("g/G".to_string(), "Oldest / latest line"),
                    (keys.clear_log.clone(), "Clear log"),
                    (keys.help.clone(), "Toggle help"),
                    (keys.quit.clone(), "Quit (stops the engine)"),
                ],
            ),
        ];

        let mut help_text = Vec::new();
        for (title, entries) in sections {
            if !help_text.is_empty() {
                help_text.push(Line::from(""));
            }
            help_text.push(Line::from(vec![Span::styled(
                title,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )]));
            for (key, description) in entries {
                help_text.push(Line::from(vec![
                    Span::styled(format!("  {key:<12}"), Style::default().fg(Color::Cyan)),
                    Span::raw(description),
                ]));
            }
        }

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}

/// One-line key hints for the current mode.
pub struct HelpBar;

impl HelpBar {
    pub fn render(frame: &mut Frame, area: Rect, editing: bool, keys: &KeyBindings) {
        if area.height == 0 {
            return;
        }
        let hint = if editing {
            " Enter confirm | Esc cancel | ←/→ move cursor ".to_string()
        } else {
            format!(
                " {} edit | {} submit | {} stop | {}/{}/{} load files | {} help | {} quit ",
                keys.select, keys.submit, keys.stop, keys.load_broker, keys.load_api, keys.load_tickers, keys.help, keys.quit
            )
        };
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}
