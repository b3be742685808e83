//! TUI widgets.

mod form_panel;
mod help;
mod log_panel;
mod notifications;
mod prompt_bar;
mod sentiment_chart;
mod status_bar;

pub use form_panel::FormPanel;
pub use help::{HelpBar, HelpPanel};
pub use log_panel::LogPanel;
pub use notifications::{render_error, render_notification};
pub use prompt_bar::PromptBar;
pub use sentiment_chart::SentimentChart;
pub use status_bar::StatusBar;
