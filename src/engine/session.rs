//! At most one engine session at a time.

use super::{EngineBridge, EngineEvent, EngineHandle};
use crate::error::{Error, Result};
use crate::form::{FormState, ValidConfig, validate};
use tracing::{debug, info};
use uuid::Uuid;

/// Owns the running engine session, if any.
pub struct TradingSession {
    bridge: EngineBridge,
    handle: Option<EngineHandle>,
}

impl TradingSession {
    pub fn new(bridge: EngineBridge) -> Self {
        Self {
            bridge,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.handle.as_ref().map(EngineHandle::id)
    }

    /// Validate the form and, if it is valid, start the engine on it.
    ///
    /// Invalid input never reaches the engine. A session that is already
    /// running is stopped before the new one starts.
    pub async fn submit(&mut self, form: &FormState) -> Result<ValidConfig> {
        let config = validate(form).map_err(Error::Validation)?;
        self.start(config.clone()).await;
        Ok(config)
    }

    /// Start the engine on an already validated configuration.
    pub async fn start(&mut self, config: ValidConfig) -> Uuid {
        if self.stop().await {
            info!("Restarting engine with new configuration");
        }
        let handle = self.bridge.start(config);
        let id = handle.id();
        self.handle = Some(handle);
        id
    }

    /// Stop the running session. Returns `false` when nothing was running.
    pub async fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => {
                debug!("Stop requested with no engine running");
                false
            }
        }
    }

    /// Wait for the next engine event.
    ///
    /// Never resolves while no session is running. The session is cleared once
    /// the engine reports that it stopped.
    pub async fn next_event(&mut self) -> EngineEvent {
        let Some(handle) = self.handle.as_mut() else {
            return std::future::pending().await;
        };

        match handle.next_event().await {
            Some(EngineEvent::Stopped { error }) => {
                self.handle = None;
                EngineEvent::Stopped { error }
            }
            Some(event) => event,
            None => {
                self.handle = None;
                EngineEvent::Stopped { error: None }
            }
        }
    }

    /// Next engine event if one is already queued.
    pub fn try_next_event(&mut self) -> Option<EngineEvent> {
        let event = self.handle.as_mut()?.try_next_event()?;
        if matches!(event, EngineEvent::Stopped { .. }) {
            self.handle = None;
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineEvents, MockTradingEngine, ShutdownSignal, TradingEngine};
    use crate::form::Field;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn valid_form() -> FormState {
        FormState::new()
            .with(Field::Login, "12345")
            .with(Field::Password, "pw")
            .with(Field::Server, "srv")
            .with(Field::Tickers, "EURUSD:EURUSD=X")
            .with(Field::Threshold, "0.5")
    }

    fn session_with(engine: impl TradingEngine + 'static) -> TradingSession {
        TradingSession::new(EngineBridge::new(
            Arc::new(engine),
            16,
            Duration::from_millis(200),
        ))
    }

    /// Counts runs and idles until told to stop.
    #[derive(Default)]
    struct CountingEngine {
        runs: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TradingEngine for CountingEngine {
        async fn run(
            &self,
            _config: ValidConfig,
            _events: EngineEvents,
            mut shutdown: ShutdownSignal,
        ) -> crate::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            shutdown.triggered().await;
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submit_hands_exact_config_to_engine() {
        let expected = validate(&valid_form()).unwrap();
        assert_eq!(expected.broker.login, 12345);
        assert_eq!(expected.tickers.provider_for("EURUSD"), Some("EURUSD=X"));
        assert_eq!(expected.strategy.threshold, 0.5);

        let mut engine = MockTradingEngine::new();
        let wanted = expected.clone();
        engine
            .expect_run()
            .withf(move |config, _, _| *config == wanted)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut session = session_with(engine);
        let submitted = session.submit(&valid_form()).await.unwrap();
        assert_eq!(submitted, expected);
        assert!(session.is_running());

        assert!(matches!(
            session.next_event().await,
            EngineEvent::Stopped { error: None }
        ));
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_engine() {
        let mut engine = MockTradingEngine::new();
        engine.expect_run().never();

        let mut session = session_with(engine);
        let form = valid_form().with(Field::Threshold, "abc");
        let err = session.submit(&form).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, Field::Threshold);
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let mut engine = MockTradingEngine::new();
        engine.expect_run().never();

        let mut session = session_with(engine);
        assert!(!session.stop().await);
        assert!(session.session_id().is_none());
    }

    #[tokio::test]
    async fn test_resubmit_restarts_session() {
        let engine = CountingEngine::default();
        let runs = Arc::clone(&engine.runs);
        let stops = Arc::clone(&engine.stops);
        let mut session = session_with(engine);

        session.submit(&valid_form()).await.unwrap();
        let first = session.session_id().unwrap();
        tokio::task::yield_now().await;

        session.submit(&valid_form()).await.unwrap();
        let second = session.session_id().unwrap();
        assert_ne!(first, second);

        assert!(session.stop().await);
        assert!(!session.is_running());
        assert_eq!(stops.load(Ordering::SeqCst), runs.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_next_event_pends_when_idle() {
        let mut session = session_with(CountingEngine::default());
        let waited = tokio::time::timeout(Duration::from_millis(20), session.next_event()).await;
        assert!(waited.is_err());
    }
}
