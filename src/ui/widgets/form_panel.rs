//! Configuration form widget.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::form::{Field, FieldKind, FormState, Section};
use crate::state::{InputMode, Store};

/// Form panel listing every field grouped by section.
pub struct FormPanel;

impl FormPanel {
    /// Render the form panel.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let selected = store.form.selected();
        let editing = store.app.input_mode == InputMode::Insert;

        let mut rows = Vec::with_capacity(Field::ALL.len() + 4);
        let mut selected_row = 0;
        let mut section: Option<Section> = None;

        for field in Field::ALL {
            if section != Some(field.section()) {
                section = Some(field.section());
                rows.push(
                    Row::new(vec![Cell::from(field.section().title())]).style(
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
            if field == selected {
                selected_row = rows.len();
            }

            let error = store.form.error_for(field);
            let label_style = if error.is_some() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Gray)
            };

            let value = if editing && field == selected {
                Line::from(Span::styled(
                    "editing…",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                ))
            } else {
                display_value(field, &store.form.values, error)
            };

            rows.push(Row::new(vec![
                Cell::from(Span::styled(format!("  {}", field.label()), label_style)),
                Cell::from(value),
            ]));
        }

        let title = match store.form.errors().len() {
            0 => " Configuration ".to_string(),
            n => format!(" Configuration ({n} error(s)) "),
        };

        let table = Table::new(rows, [Constraint::Length(26), Constraint::Min(10)])
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .row_highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(selected_row));
        frame.render_stateful_widget(table, area, &mut state);
    }
}

/// Rendered value for a field: masked, checkbox, choice or plain text,
/// followed by its error if it has one.
fn display_value<'a>(field: Field, form: &'a FormState, error: Option<&'a str>) -> Line<'a> {
    let raw = form.get(field);
    let mut spans = match field.kind() {
        FieldKind::Secret if raw.is_empty() => vec![placeholder()],
        FieldKind::Secret => vec![Span::raw("•".repeat(raw.chars().count().min(16)))],
        FieldKind::Toggle => {
            let (mark, color) = if form.is_on(field) {
                ("[x] on", Color::Green)
            } else {
                ("[ ] off", Color::DarkGray)
            };
            vec![Span::styled(mark, Style::default().fg(color))]
        }
        FieldKind::Choice(_) => vec![
            Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
            Span::styled(raw, Style::default().fg(Color::Cyan)),
            Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
        ],
        _ if raw.is_empty() => vec![placeholder()],
        _ => vec![Span::raw(raw.replace('\n', " "))],
    };

    if let Some(error) = error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

fn placeholder() -> Span<'static> {
    Span::styled("-", Style::default().fg(Color::DarkGray))
}
