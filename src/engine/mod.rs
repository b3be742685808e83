//! Bridge to the external trading/sentiment engine.
//!
//! The engine itself is opaque: it receives a [`ValidConfig`] once, then
//! streams [`EngineEvent`]s back until it finishes or is told to stop. This
//! module owns the seam and nothing else. It performs no retries, no backoff
//! and no interpretation of engine failures.

mod bridge;
mod events;
mod process;
mod session;

pub use bridge::{EngineBridge, EngineHandle};
pub use events::{EngineEvent, EngineEvents, LogLevel, LogLine, Prompt, SentimentSample, ShutdownSignal};
pub use process::ProcessEngine;
pub use session::TradingSession;

use crate::error::Result;
use crate::form::ValidConfig;
use async_trait::async_trait;

/// An external engine that trades on a validated configuration.
///
/// `run` is called once per session on a background task. It should return
/// when the engine finishes on its own or soon after `shutdown` fires. Any
/// error it returns is shown to the user verbatim.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradingEngine: Send + Sync {
    async fn run(
        &self,
        config: ValidConfig,
        events: EngineEvents,
        shutdown: ShutdownSignal,
    ) -> Result<()>;
}
