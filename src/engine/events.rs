//! Events flowing from the engine to the display.

use crate::error::{Error, Result};
use chrono::{DateTime, Local, Utc};
use std::fmt;
use tokio::sync::{mpsc, oneshot, watch};

/// Severity of an engine log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name as engines commonly spell it, case-insensitively.
    /// Unknown names map to `Info`.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" | "debug" => Self::Debug,
            "warn" | "warning" => Self::Warning,
            "error" | "critical" | "fatal" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line in the display log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// Latest sentiment score the engine computed for a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSample {
    pub ticker: String,
    /// Score in `-1.0..=1.0`; negative is bearish.
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

impl SentimentSample {
    pub fn new(ticker: impl Into<String>, score: f64) -> Self {
        Self {
            ticker: ticker.into(),
            score,
            timestamp: Utc::now(),
        }
    }
}

/// A question the engine needs the user to answer.
#[derive(Debug)]
pub struct Prompt {
    pub message: String,
    reply: oneshot::Sender<String>,
}

impl Prompt {
    /// Send the user's answer back to the engine.
    pub fn answer(self, response: impl Into<String>) -> Result<()> {
        self.reply
            .send(response.into())
            .map_err(|_| Error::channel("engine is no longer waiting for an answer"))
    }
}

/// Everything the engine can tell the foreground.
#[derive(Debug)]
pub enum EngineEvent {
    Log(LogLine),
    Sentiment(SentimentSample),
    Prompt(Prompt),
    /// The engine task ended. `error` holds its failure, verbatim.
    Stopped { error: Option<String> },
}

/// Sending half handed to the engine.
///
/// Backed by a bounded channel, so sends wait while the display catches up.
#[derive(Debug, Clone)]
pub struct EngineEvents {
    tx: mpsc::Sender<EngineEvent>,
}

impl EngineEvents {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: EngineEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| Error::channel("display is no longer receiving engine events"))
    }

    pub async fn log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        self.send(EngineEvent::Log(LogLine::new(level, message))).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, message).await
    }

    pub async fn sentiment(&self, ticker: impl Into<String>, score: f64) -> Result<()> {
        self.send(EngineEvent::Sentiment(SentimentSample::new(ticker, score)))
            .await
    }

    /// Ask the user a question and wait for the answer.
    pub async fn prompt(&self, message: impl Into<String>) -> Result<String> {
        let (reply, answer) = oneshot::channel();
        self.send(EngineEvent::Prompt(Prompt {
            message: message.into(),
            reply,
        }))
        .await?;
        answer
            .await
            .map_err(|_| Error::channel("prompt was dismissed without an answer"))
    }
}

/// Fires once when the session is asked to stop.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once stop was requested, or the session owner went away.
    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_levels() {
        assert_eq!(LogLevel::parse_lenient("WARNING"), LogLevel::Warning);
        assert_eq!(LogLevel::parse_lenient("warn"), LogLevel::Warning);
        assert_eq!(LogLevel::parse_lenient("CRITICAL"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient("trace"), LogLevel::Debug);
        assert_eq!(LogLevel::parse_lenient("success"), LogLevel::Info);
    }

    #[tokio::test]
    async fn test_prompt_round_trip() {
        let (tx, mut rx) = mpsc::channel(4);
        let events = EngineEvents::new(tx);

        let asking = tokio::spawn(async move { events.prompt("Continue? [y/n]").await });

        let Some(EngineEvent::Prompt(prompt)) = rx.recv().await else {
            panic!("expected a prompt");
        };
        assert_eq!(prompt.message, "Continue? [y/n]");
        prompt.answer("y").unwrap();

        assert_eq!(asking.await.unwrap().unwrap(), "y");
    }

    #[tokio::test]
    async fn test_dropped_prompt_is_an_error() {
        let (tx, mut rx) = mpsc::channel(4);
        let events = EngineEvents::new(tx);

        let asking = tokio::spawn(async move { events.prompt("Continue?").await });
        drop(rx.recv().await);

        assert!(matches!(asking.await.unwrap(), Err(Error::Channel(_))));
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let (tx, rx) = watch::channel(false);
        let mut signal = ShutdownSignal::new(rx);
        assert!(!signal.is_triggered());

        tx.send(true).unwrap();
        signal.triggered().await;
        assert!(signal.is_triggered());
    }
}
