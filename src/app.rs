//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, the engine session and rendering.

use crate::config::Settings;
use crate::engine::{EngineBridge, ProcessEngine, TradingSession};
use crate::error::Result;
use crate::events::EventHandler;
use crate::form::Field;
use crate::state::{Action, Store};
use crate::ui::Ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Engine events applied per frame before redrawing.
const MAX_EVENTS_PER_FRAME: usize = 512;

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Engine session.
    session: TradingSession,
    /// Configuration.
    settings: Settings,
}

impl App {
    /// Create a new application.
    pub fn new(settings: Settings) -> Result<Self> {
        let engine = ProcessEngine::from_settings(&settings.engine);
        let bridge = EngineBridge::with_settings(Arc::new(engine), &settings.engine);

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        // Create store and pre-fill file paths
        let mut store = Store::new(action_tx, &settings.ui);
        let files = [
            (Field::BrokerFile, &settings.files.broker_credentials, Action::LoadBrokerFile),
            (Field::ApiFile, &settings.files.api_credentials, Action::LoadApiFile),
            (Field::TickersFile, &settings.files.tickers, Action::LoadTickersFile),
        ];
        for (field, path, load) in files {
            if let Some(path) = path {
                store.form.set(field, path.display().to_string());
                store.dispatch(load)?;
            }
        }

        let event_handler = EventHandler::new(
            settings.keybindings.clone(),
            Duration::from_millis(settings.ui.tick_rate_ms),
        );

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if settings.ui.mouse_support {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            store,
            event_handler,
            action_rx,
            session: TradingSession::new(bridge),
            settings,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        if self.settings.engine.program.trim().is_empty() {
            tracing::warn!("No engine program configured");
        }

        loop {
            // Update event handler with current state
            self.event_handler.update_store_snapshot(&self.store);

            // Render UI
            let keys = &self.settings.keybindings;
            let store = &self.store;
            self.terminal.draw(|frame| Ui::render(frame, store, keys))?;

            tokio::select! {
                biased;

                // Engine events first so the log keeps up
                event = self.session.next_event() => {
                    self.store.on_engine_event(event);
                    self.drain_engine_events();
                }

                // Handle actions from the channel
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await?;
                }

                // Handle terminal events
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action).await?;
                    }
                }
            }

            // Check if we should quit
            if self.store.app.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply events that queued up while the last one was handled.
    fn drain_engine_events(&mut self) {
        for _ in 0..MAX_EVENTS_PER_FRAME {
            match self.session.try_next_event() {
                Some(event) => self.store.on_engine_event(event),
                None => break,
            }
        }
    }

    /// Handle an action.
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Submit => self.submit().await,
            Action::StopEngine => {
                let was_running = self.session.stop().await;
                self.store.engine_stopped(was_running);
            }
            Action::Quit => {
                if self.session.stop().await {
                    self.store.engine_stopped(true);
                }
                self.store.reduce(Action::Quit);
            }
            _ => {
                // Let the store handle the action
                self.store.reduce(action);
            }
        }

        Ok(())
    }

    /// Validate the form and hand it to a fresh engine session.
    async fn submit(&mut self) {
        match self.session.submit(&self.store.form.values).await {
            Ok(config) => {
                if let Some(id) = self.session.session_id() {
                    self.store.engine_started(id, &config);
                }
            }
            Err(e) => {
                tracing::debug!("Submission rejected: {}", e);
                self.store.submit_failed(e);
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
