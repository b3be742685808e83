//! Starting and stopping engine sessions.

use super::{EngineEvent, EngineEvents, ShutdownSignal, TradingEngine};
use crate::config::EngineSettings;
use crate::form::ValidConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Launches engine sessions on background tasks.
#[derive(Clone)]
pub struct EngineBridge {
    engine: Arc<dyn TradingEngine>,
    event_capacity: usize,
    stop_grace: Duration,
}

impl EngineBridge {
    /// Create a bridge around an engine.
    pub fn new(engine: Arc<dyn TradingEngine>, event_capacity: usize, stop_grace: Duration) -> Self {
        Self {
            engine,
            event_capacity: event_capacity.max(1),
            stop_grace,
        }
    }

    /// Create a bridge using channel and shutdown settings from configuration.
    pub fn with_settings(engine: Arc<dyn TradingEngine>, settings: &EngineSettings) -> Self {
        Self::new(
            engine,
            settings.event_capacity,
            Duration::from_millis(settings.stop_grace_ms),
        )
    }

    /// Hand a validated configuration to the engine.
    ///
    /// The engine runs until it returns or the returned handle is stopped.
    /// Its outcome arrives as a final [`EngineEvent::Stopped`].
    pub fn start(&self, config: ValidConfig) -> EngineHandle {
        let id = Uuid::new_v4();
        let (event_tx, event_rx) = mpsc::channel(self.event_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let engine = Arc::clone(&self.engine);
        let events = EngineEvents::new(event_tx.clone());
        let shutdown = ShutdownSignal::new(shutdown_rx);
        let symbols = config.tickers.len();

        let task = tokio::spawn(
            async move {
                info!(symbols, "Engine session started");
                let error = match engine.run(config, events, shutdown).await {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("Engine session failed: {}", e);
                        Some(e.to_string())
                    }
                };
                info!("Engine session ended");
                let _ = event_tx.send(EngineEvent::Stopped { error }).await;
            }
            .instrument(info_span!("engine", session = %id)),
        );

        EngineHandle {
            id,
            events: event_rx,
            shutdown: shutdown_tx,
            task: Some(task),
            stop_grace: self.stop_grace,
        }
    }

    /// Stop a session if there is one. Stopping nothing is a no-op.
    pub async fn stop(&self, handle: Option<EngineHandle>) {
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }
}

/// Owned handle to one running engine session.
///
/// Dropping the handle without calling [`EngineHandle::stop`] still halts the
/// engine, just without a grace period.
pub struct EngineHandle {
    id: Uuid,
    events: mpsc::Receiver<EngineEvent>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
    stop_grace: Duration,
}

impl EngineHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next event from the engine, in arrival order.
    ///
    /// Returns `None` once the engine task is gone and all events were read.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        self.events.try_recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signal the engine to stop, wait out the grace period, then abort it.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        let Some(mut task) = self.task.take() else {
            return;
        };

        if tokio::time::timeout(self.stop_grace, &mut task).await.is_err() {
            warn!(session = %self.id, "Engine ignored shutdown, aborting");
            task.abort();
            let _ = task.await;
        }
        info!(session = %self.id, "Engine session stopped");
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.shutdown.send(true);
            task.abort();
        }
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("id", &self.id)
            .field("finished", &self.is_finished())
            .finish()
    }
}
