//! State management for Strader.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Engine events bypass
//! the action channel and land in [`Store::on_engine_event`], since prompts
//! carry a reply channel and cannot be cloned.

mod app_state;
mod form_state;
mod log_state;
mod sentiment_state;

pub use app_state::{AppState, EngineStatus, InputMode};
pub use form_state::FormView;
pub use log_state::LogState;
pub use sentiment_state::{SentimentBar, SentimentState};

use crate::config::UiConfig;
use crate::credentials::{BrokerSection, CredentialFile, load_tickers_file};
use crate::engine::{EngineEvent, LogLevel, LogLine, Prompt};
use crate::error::{Error, Result};
use crate::form::{Field, FieldKind, ValidConfig};
use chrono::Local;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const PAGE_LINES: usize = 10;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Form navigation
    NextField,
    PreviousField,
    FirstField,
    LastField,
    SelectField(Field),

    // Form editing
    ActivateField,
    CycleField { forward: bool },
    SetField(Field, String),
    ResetForm,

    // Text input
    InputChar(char),
    InputBackspace,
    InputDelete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    CommitInput,
    CancelInput,
    ResumePrompt,

    // Files
    LoadBrokerFile,
    LoadApiFile,
    LoadTickersFile,

    // Engine, handled by the app
    Submit,
    StopEngine,

    // Log panel
    ScrollLogUp,
    ScrollLogDown,
    PageLogUp,
    PageLogDown,
    LogTop,
    LogBottom,
    ClearLog,

    // UI actions
    Tick,
    ToggleHelp,
    ShowNotification(Notification),
    DismissNotification,

    // Error handling
    SetError(String),
    ClearError,

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
    pub created_at: Instant,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    fn new(message: impl Into<String>, level: NotificationLevel, duration_secs: u64) -> Self {
        Self {
            message: message.into(),
            level,
            duration_secs,
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info, 3)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success, 3)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Warning, 5)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error, 10)
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= Duration::from_secs(self.duration_secs)
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// Configuration form.
    pub form: FormView,
    /// Log panel.
    pub log: LogState,
    /// Sentiment chart data.
    pub sentiment: SentimentState,
    /// Question the engine is waiting on.
    pending_prompt: Option<Prompt>,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, ui: &UiConfig) -> Self {
        let mut app = AppState::new();
        app.show_help_bar = ui.show_help_bar;
        Self {
            app,
            form: FormView::default(),
            log: LogState::with_capacity(ui.max_log_lines),
            sentiment: SentimentState::default(),
            pending_prompt: None,
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| Error::channel(e.to_string()))
    }

    /// The engine's unanswered question, if any.
    pub fn pending_prompt(&self) -> Option<&str> {
        self.pending_prompt.as_ref().map(|p| p.message.as_str())
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Form navigation
            Action::NextField => self.form.select_next(),
            Action::PreviousField => self.form.select_previous(),
            Action::FirstField => self.form.select_first(),
            Action::LastField => self.form.select_last(),
            Action::SelectField(field) => self.form.select(field),

            // Form editing
            Action::ActivateField => self.activate_selected(),
            Action::CycleField { forward } => {
                let field = self.form.selected();
                match field.kind() {
                    FieldKind::Toggle => self.form.values.toggle(field),
                    FieldKind::Choice(_) => self.form.values.cycle(field, forward),
                    _ => return,
                }
                self.form.clear_errors_for(field);
            }
            Action::SetField(field, value) => self.form.set(field, value),
            Action::ResetForm => {
                self.form.reset();
                self.record(LogLine::info("Form reset to defaults"));
            }

            // Text input
            Action::InputChar(c) => self.app.push_char(c),
            Action::InputBackspace => self.app.pop_char(),
            Action::InputDelete => self.app.delete_char(),
            Action::CursorLeft => self.app.cursor_left(),
            Action::CursorRight => self.app.cursor_right(),
            Action::CursorHome => self.app.cursor_home(),
            Action::CursorEnd => self.app.cursor_end(),
            Action::CommitInput => self.commit_input(),
            Action::CancelInput => {
                if self.app.input_mode == InputMode::Prompt {
                    self.app.notification = Some(Notification::info(
                        "Engine is still waiting for an answer, press p to reply",
                    ));
                }
                self.app.take_input();
            }
            Action::ResumePrompt => {
                if self.pending_prompt.is_some() {
                    self.app.begin_input(InputMode::Prompt, "");
                }
            }

            // Files
            Action::LoadBrokerFile => self.load_broker_file(),
            Action::LoadApiFile => self.load_api_file(),
            Action::LoadTickersFile => self.load_tickers_file(),

            // The app runs these against the engine session.
            Action::Submit | Action::StopEngine => {}

            // Log panel
            Action::ScrollLogUp => self.log.scroll_up(1),
            Action::ScrollLogDown => self.log.scroll_down(1),
            Action::PageLogUp => self.log.scroll_up(PAGE_LINES),
            Action::PageLogDown => self.log.scroll_down(PAGE_LINES),
            Action::LogTop => self.log.scroll_to_top(),
            Action::LogBottom => self.log.scroll_to_bottom(),
            Action::ClearLog => self.log.clear(),

            // UI actions
            Action::Tick => {
                if self.app.notification.as_ref().is_some_and(Notification::is_expired) {
                    self.app.notification = None;
                }
            }
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
            }
            Action::DismissNotification => {
                self.app.notification = None;
            }

            // Error handling
            Action::SetError(error) => {
                self.app.error = Some(error);
            }
            Action::ClearError => {
                self.app.error = None;
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    /// Apply an event from the running engine.
    pub fn on_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Log(line) => self.record(line),
            EngineEvent::Sentiment(sample) => self.sentiment.update(sample),
            EngineEvent::Prompt(prompt) => {
                self.record(LogLine::info(prompt.message.clone()));
                self.pending_prompt = Some(prompt);
                if self.app.input_mode == InputMode::Normal {
                    self.app.begin_input(InputMode::Prompt, "");
                } else {
                    self.app.notification =
                        Some(Notification::warning("Engine is waiting for input, press p to reply"));
                }
            }
            EngineEvent::Stopped { error } => {
                self.session_ended();
                match error {
                    Some(error) => {
                        self.record(LogLine::error(error));
                        self.app.notification = Some(Notification::error("Engine stopped with an error"));
                    }
                    None => self.record(LogLine::info("Engine finished")),
                }
            }
        }
    }

    /// A validated configuration was handed to a new engine session.
    pub fn engine_started(&mut self, session: Uuid, config: &ValidConfig) {
        if self.app.engine.is_running() {
            self.record(LogLine::info("Previous engine session stopped"));
        }
        self.pending_prompt = None;
        self.form.clear_errors();
        self.sentiment.reset(config.strategy.threshold);

        let account = config.broker.account_label();
        let symbols = config.tickers.len();
        self.record(LogLine::info(format!(
            "Starting engine for {account} on {symbols} symbol(s), max {} trade(s) per symbol",
            config.max_trades()
        )));
        self.app.engine = EngineStatus::Running {
            session,
            account,
            symbols,
            since: Local::now(),
        };
        self.app.notification = Some(Notification::success("Engine started"));
    }

    /// Submission was refused, either by validation or by the engine bridge.
    pub fn submit_failed(&mut self, error: Error) {
        match error {
            Error::Validation(errors) => {
                let count = errors.len();
                if let Some(first) = errors.first() {
                    self.form.select(first.field);
                }
                self.record(LogLine::warning(Error::Validation(errors.clone()).to_string()));
                self.form.set_errors(errors);
                self.app.notification = Some(Notification::warning(format!(
                    "{count} field(s) need attention"
                )));
            }
            other => self.report(other),
        }
    }

    /// The user stopped the engine. `was_running` is false when there was
    /// nothing to stop.
    pub fn engine_stopped(&mut self, was_running: bool) {
        if was_running {
            self.session_ended();
            self.record(LogLine::info("Engine stopped"));
            self.app.notification = Some(Notification::info("Engine stopped"));
        } else {
            self.app.notification = Some(Notification::info("Engine is not running"));
        }
    }

    fn session_ended(&mut self) {
        self.app.engine = EngineStatus::Idle;
        self.pending_prompt = None;
        if self.app.input_mode == InputMode::Prompt {
            self.app.take_input();
        }
    }

    fn activate_selected(&mut self) {
        let field = self.form.selected();
        match field.kind() {
            FieldKind::Toggle => {
                self.form.values.toggle(field);
                self.form.clear_errors_for(field);
            }
            FieldKind::Choice(_) => {
                self.form.values.cycle(field, true);
                self.form.clear_errors_for(field);
            }
            FieldKind::Text | FieldKind::Secret | FieldKind::Path => {
                let current = self.form.values.get(field).to_string();
                self.app.begin_input(InputMode::Insert, &current);
            }
        }
    }

    fn commit_input(&mut self) {
        match self.app.input_mode {
            InputMode::Insert => {
                let value = self.app.take_input();
                self.form.set(self.form.selected(), value.trim());
            }
            InputMode::Prompt => {
                let answer = self.app.take_input();
                self.answer_prompt(answer);
            }
            InputMode::Normal => {}
        }
    }

    fn answer_prompt(&mut self, answer: String) {
        let Some(prompt) = self.pending_prompt.take() else {
            return;
        };
        self.record(LogLine::info(format!(">>> User input: {answer}")));
        if let Err(e) = prompt.answer(answer) {
            self.record(LogLine::warning(e.to_string()));
        }
    }

    /// Path typed into a file field, or `None` with a warning if blank.
    fn file_path(&mut self, field: Field) -> Option<PathBuf> {
        let raw = self.form.values.get(field).trim();
        if raw.is_empty() {
            self.app.notification = Some(Notification::warning(format!("{} is empty", field.label())));
            return None;
        }
        Some(PathBuf::from(raw))
    }

    fn load_broker_file(&mut self) {
        let Some(path) = self.file_path(Field::BrokerFile) else {
            return;
        };
        match CredentialFile::load(&path) {
            Ok(CredentialFile {
                broker: Some(section),
                ..
            }) => {
                self.apply_broker(&section);
                self.record(LogLine::info(format!(
                    "Loaded broker credentials from {}",
                    path.display()
                )));
                self.app.notification = Some(Notification::success("Broker credentials loaded"));
            }
            Ok(CredentialFile { broker: None, .. }) => {
                self.apply_broker(&BrokerSection::default());
                self.record(LogLine::warning(format!(
                    "No [MT5] section in {}",
                    path.display()
                )));
                self.app.notification = Some(Notification::warning("No broker credentials found"));
            }
            Err(e) => self.report(e),
        }
    }

    fn apply_broker(&mut self, section: &BrokerSection) {
        self.form.values.apply_broker_credentials(section);
        for field in [Field::TerminalPath, Field::Login, Field::Password, Field::Server] {
            self.form.clear_errors_for(field);
        }
    }

    fn load_api_file(&mut self) {
        let Some(path) = self.file_path(Field::ApiFile) else {
            return;
        };
        match CredentialFile::load(&path) {
            Ok(file) => {
                let found = file.api.is_some();
                self.form
                    .values
                    .apply_api_credentials(&file.api.unwrap_or_default());
                if found {
                    self.record(LogLine::info(format!(
                        "Loaded API credentials from {}",
                        path.display()
                    )));
                    self.app.notification = Some(Notification::success("API credentials loaded"));
                } else {
                    self.record(LogLine::warning(format!(
                        "No [API] section in {}",
                        path.display()
                    )));
                    self.app.notification = Some(Notification::warning("No API credentials found"));
                }
            }
            Err(e) => self.report(e),
        }
    }

    fn load_tickers_file(&mut self) {
        let Some(path) = self.file_path(Field::TickersFile) else {
            return;
        };
        match load_tickers_file(&path) {
            Ok(tickers) => {
                self.form.set(Field::Tickers, tickers);
                self.record(LogLine::info(format!("Loaded tickers from {}", path.display())));
            }
            Err(e) => self.report(e),
        }
    }

    /// Surface an error as a log line and a notification.
    fn report(&mut self, error: Error) {
        let message = error.to_string();
        self.record(LogLine::error(message.clone()));
        self.app.notification = Some(if error.is_recoverable() {
            Notification::warning(message)
        } else {
            Notification::error(message)
        });
    }

    /// Append a line to the log panel and mirror it to the log file.
    fn record(&mut self, line: LogLine) {
        match line.level {
            LogLevel::Debug => tracing::debug!(target: "strader::engine", "{}", line.message),
            LogLevel::Info => tracing::info!(target: "strader::engine", "{}", line.message),
            LogLevel::Warning => tracing::warn!(target: "strader::engine", "{}", line.message),
            LogLevel::Error => tracing::error!(target: "strader::engine", "{}", line.message),
        }
        self.log.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineEvents, SentimentSample};
    use crate::form::{FormState, validate};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx, &UiConfig::default())
    }

    fn ini(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn last_message(store: &Store) -> &str {
        store.log.last().map(|l| l.message.as_str()).unwrap_or_default()
    }

    fn valid_config() -> ValidConfig {
        let form = FormState::new()
            .with(Field::Login, "12345")
            .with(Field::Password, "pw")
            .with(Field::Server, "srv-Demo")
            .with(Field::Tickers, "EURUSD:EURUSD=X, AAPL:AAPL")
            .with(Field::Threshold, "0.5");
        validate(&form).unwrap()
    }

    #[test]
    fn test_load_broker_file_fills_form() {
        let file = ini("[MT5]\nlogin = 12345\npassword = pw\nserver = Broker-Demo\n");
        let mut store = store();
        store.reduce(Action::SetField(
            Field::BrokerFile,
            file.path().display().to_string(),
        ));
        store.reduce(Action::LoadBrokerFile);

        assert_eq!(store.form.values.get(Field::Login), "12345");
        assert_eq!(store.form.values.get(Field::Password), "pw");
        assert_eq!(store.form.values.get(Field::Server), "Broker-Demo");
        assert!(last_message(&store).starts_with("Loaded broker credentials"));
    }

    #[test]
    fn test_missing_section_blanks_fields_with_warning() {
        let file = ini("[API]\nfmp_api = key\n");
        let mut store = store();
        store.form.set(Field::Login, "999");
        store.form.set(Field::BrokerFile, file.path().display().to_string());
        store.reduce(Action::LoadBrokerFile);

        assert_eq!(store.form.values.get(Field::Login), "");
        let line = store.log.last().unwrap();
        assert_eq!(line.level, LogLevel::Warning);
        assert!(line.message.starts_with("No [MT5] section"));
    }

    #[test]
    fn test_unreadable_file_is_reported_not_fatal() {
        let mut store = store();
        store.form.set(Field::ApiFile, "/no/such/api.ini");
        store.reduce(Action::LoadApiFile);

        assert_eq!(store.log.last().unwrap().level, LogLevel::Error);
        let notification = store.app.notification.as_ref().unwrap();
        assert_eq!(notification.level, NotificationLevel::Warning);
        assert!(!store.app.should_quit);
    }

    #[test]
    fn test_load_tickers_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "EURUSD:EURUSD=X,\nAAPL:AAPL").unwrap();
        let mut store = store();
        store.form.set(Field::TickersFile, file.path().display().to_string());
        store.reduce(Action::LoadTickersFile);

        assert_eq!(store.form.values.get(Field::Tickers), "EURUSD:EURUSD=X,\nAAPL:AAPL");
    }

    #[test]
    fn test_blank_file_path_warns() {
        let mut store = store();
        store.reduce(Action::LoadTickersFile);
        assert!(store.log.is_empty());
        assert_eq!(
            store.app.notification.as_ref().unwrap().message,
            "Tickers File is empty"
        );
    }

    #[test]
    fn test_activate_by_field_kind() {
        let mut store = store();

        store.reduce(Action::SelectField(Field::AutoTrade));
        store.reduce(Action::ActivateField);
        assert!(store.form.values.is_on(Field::AutoTrade));

        store.reduce(Action::SelectField(Field::Period));
        store.reduce(Action::ActivateField);
        assert_eq!(store.form.values.get(Field::Period), "week");
        store.reduce(Action::CycleField { forward: false });
        assert_eq!(store.form.values.get(Field::Period), "month");

        store.reduce(Action::SelectField(Field::Server));
        store.reduce(Action::ActivateField);
        assert_eq!(store.app.input_mode, InputMode::Insert);
        for c in " srv ".chars() {
            store.reduce(Action::InputChar(c));
        }
        store.reduce(Action::CommitInput);
        assert_eq!(store.app.input_mode, InputMode::Normal);
        assert_eq!(store.form.values.get(Field::Server), "srv");
    }

    #[test]
    fn test_cancel_input_keeps_value() {
        let mut store = store();
        store.form.set(Field::Login, "1");
        store.reduce(Action::SelectField(Field::Login));
        store.reduce(Action::ActivateField);
        store.reduce(Action::InputChar('2'));
        store.reduce(Action::CancelInput);
        assert_eq!(store.form.values.get(Field::Login), "1");
    }

    #[test]
    fn test_validation_errors_shown_inline() {
        let mut store = store();
        let form = store.form.values.clone().with(Field::Threshold, "abc");
        let err = validate(&form).map_err(Error::Validation).unwrap_err();
        store.submit_failed(err);

        assert!(store.form.error_for(Field::Login).is_some());
        assert_eq!(
            store.form.error_for(Field::Threshold),
            Some("'abc' is not a number")
        );
        assert_eq!(store.form.selected(), Field::Login);
        assert!(!store.app.engine.is_running());
    }

    #[test]
    fn test_engine_lifecycle() {
        let mut store = store();
        let config = valid_config();
        store.engine_started(Uuid::new_v4(), &config);

        let EngineStatus::Running { account, symbols, .. } = &store.app.engine else {
            panic!("engine should be running");
        };
        assert_eq!(account, "12345@srv");
        assert_eq!(*symbols, 2);
        assert_eq!(store.sentiment.threshold, 0.5);

        store.on_engine_event(EngineEvent::Log(LogLine::info("Connected to MT5")));
        store.on_engine_event(EngineEvent::Sentiment(SentimentSample::new("AAPL", 0.8)));
        assert_eq!(last_message(&store), "Connected to MT5");
        assert_eq!(store.sentiment.score("AAPL"), Some(0.8));

        store.on_engine_event(EngineEvent::Stopped {
            error: Some("Login failed: invalid account".into()),
        });
        assert!(!store.app.engine.is_running());
        assert_eq!(last_message(&store), "Login failed: invalid account");
        assert_eq!(store.log.last().unwrap().level, LogLevel::Error);
    }

    #[test]
    fn test_stop_when_idle_only_notifies() {
        let mut store = store();
        store.engine_stopped(false);
        assert!(store.log.is_empty());
        assert_eq!(
            store.app.notification.as_ref().unwrap().message,
            "Engine is not running"
        );
    }

    #[tokio::test]
    async fn test_prompt_answer_reaches_engine() {
        let (tx, mut rx) = mpsc::channel(4);
        let events = EngineEvents::new(tx);
        let asking = tokio::spawn(async move { events.prompt("Close all positions? [y/n]").await });

        let mut store = store();
        store.on_engine_event(rx.recv().await.unwrap());
        assert_eq!(store.app.input_mode, InputMode::Prompt);
        assert_eq!(store.pending_prompt(), Some("Close all positions? [y/n]"));

        store.reduce(Action::InputChar('y'));
        store.reduce(Action::CommitInput);

        assert_eq!(asking.await.unwrap().unwrap(), "y");
        assert_eq!(last_message(&store), ">>> User input: y");
        assert!(store.pending_prompt().is_none());
    }

    #[tokio::test]
    async fn test_prompt_can_be_resumed() {
        let (tx, mut rx) = mpsc::channel(4);
        let events = EngineEvents::new(tx);
        let _asking = tokio::spawn(async move { events.prompt("Continue?").await });

        let mut store = store();
        store.on_engine_event(rx.recv().await.unwrap());
        store.reduce(Action::CancelInput);
        assert_eq!(store.app.input_mode, InputMode::Normal);
        assert!(store.pending_prompt().is_some());

        store.reduce(Action::ResumePrompt);
        assert_eq!(store.app.input_mode, InputMode::Prompt);
    }
}
