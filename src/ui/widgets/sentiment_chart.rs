//! Sentiment bar chart widget.

use ratatui::{
    Frame,
    layout::{Direction, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

use crate::state::{SentimentBar, Store};

/// Scores are scaled by this before charting, since bars hold integers.
const SCALE: f64 = 100.0;

/// Latest sentiment per ticker as horizontal bars.
pub struct SentimentChart;

impl SentimentChart {
    /// Render the sentiment chart.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let title = match store.sentiment.last_updated {
            Some(at) => format!(
                " Sentiment (|score| ≥ {:.2}) updated {} ",
                store.sentiment.threshold / 2.0,
                at.with_timezone(&chrono::Local).format("%H:%M:%S")
            ),
            None => " Sentiment ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let bars: Vec<Bar> = store.sentiment.chart_bars().iter().map(bar).collect();
        if bars.is_empty() {
            let waiting = Paragraph::new("Waiting for sentiment data")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(waiting, area);
            return;
        }

        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars))
            .bar_width(1)
            .bar_gap(0)
            .max(SCALE as u64);

        frame.render_widget(chart, area);
    }
}

fn bar<'a>(entry: &SentimentBar<'a>) -> Bar<'a> {
    let color = if entry.score >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Bar::default()
        .label(Line::from(entry.ticker))
        .value((entry.score.abs().min(1.0) * SCALE).round() as u64)
        .text_value(format!("{:+.2}", entry.score))
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
}
