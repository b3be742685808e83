//! Engine running as an external child process.
//!
//! The child receives the configuration as a single JSON line on stdin and
//! answers with newline-delimited JSON events on stdout:
//!
//! ```text
//! {"event":"log","level":"info","message":"Connected to MT5"}
//! {"event":"sentiment","ticker":"EURUSD=X","score":0.42}
//! {"event":"prompt","message":"Close all positions? [y/n]"}
//! ```
//!
//! Anything else it prints, on stdout or stderr, shows up as a log line.

use super::{EngineEvents, LogLevel, ShutdownSignal, TradingEngine};
use crate::config::EngineSettings;
use crate::error::{Error, Result};
use crate::form::ValidConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, info, warn};

/// First line written to the engine.
#[derive(Serialize)]
struct StartRequest<'a> {
    #[serde(flatten)]
    config: &'a ValidConfig,
    max_trades: u32,
    account: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WireEvent {
    Log {
        #[serde(default)]
        level: Option<String>,
        message: String,
    },
    Sentiment {
        ticker: String,
        score: f64,
    },
    Prompt {
        message: String,
    },
}

/// Launches the configured program once per session.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        let engine = Self::new(settings.program.clone(), settings.args.clone());
        match &settings.working_dir {
            Some(dir) => engine.with_working_dir(dir),
            None => engine,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

#[async_trait]
impl TradingEngine for ProcessEngine {
    async fn run(
        &self,
        config: ValidConfig,
        events: EngineEvents,
        mut shutdown: ShutdownSignal,
    ) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(Error::engine(
                "No engine program configured. Set [engine] program in the settings file.",
            ));
        }

        if shutdown.is_triggered() {
            debug!("Stopped before the engine process was launched");
            return Ok(());
        }

        let mut child = self
            .command()
            .spawn()
            .map_err(|e| Error::engine(format!("Failed to start engine '{}': {}", self.program, e)))?;
        info!(program = %self.program, pid = ?child.id(), "Engine process spawned");

        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(Error::engine("Engine process has no standard streams"));
        };

        // stderr is read from the start so a crash during startup still shows up.
        let stderr_task = tokio::spawn(relay_stderr(BufReader::new(stderr), events.clone()));

        let request = StartRequest {
            config: &config,
            max_trades: config.max_trades(),
            account: config.broker.account_label(),
        };
        let unsent = write_line(&mut stdin, &serde_json::to_string(&request)?)
            .await
            .err();
        if let Some(e) = &unsent {
            warn!("Engine did not accept its configuration: {}", e);
        }

        let mut stdout = BufReader::new(stdout);
        let mut stopped = false;
        while !stopped {
            tokio::select! {
                _ = shutdown.triggered() => stopped = true,
                line = next_line(&mut stdout) => match line {
                    Ok(Some(line)) => {
                        stopped = !forward(&line, &events, &mut stdin, &mut shutdown).await?;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        events
                            .log(LogLevel::Error, format!("Failed to read engine output: {e}"))
                            .await?;
                        tokio::select! {
                            _ = shutdown.triggered() => stopped = true,
                            _ = discard_rest(&mut stdout) => {}
                        }
                        break;
                    }
                },
            }
        }

        if stopped {
            debug!("Shutdown requested, killing engine process");
            child.kill().await?;
            stderr_task.abort();
        }
        let status = child.wait().await?;
        let _ = stderr_task.await;

        if stopped {
            Ok(())
        } else if !status.success() {
            Err(Error::engine(format!("Engine process exited with {status}")))
        } else if let Some(e) = unsent {
            Err(Error::engine(format!(
                "Engine process exited without reading its configuration: {e}"
            )))
        } else {
            Ok(())
        }
    }
}

/// Next line of engine output without its line ending. Bytes that are not
/// valid UTF-8 are replaced rather than rejected.
async fn next_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
    }
    if buf.ends_with(b"\r") {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Keep the pipe open until the engine closes it.
async fn discard_rest<R: AsyncBufRead + Unpin>(reader: &mut R) {
    if let Err(e) = tokio::io::copy_buf(reader, &mut tokio::io::sink()).await {
        debug!("Stopped draining engine output: {}", e);
    }
}

/// Forward stderr as warnings until the engine closes it.
async fn relay_stderr<R: AsyncBufRead + Unpin>(mut reader: R, events: EngineEvents) {
    loop {
        match next_line(&mut reader).await {
            Ok(Some(line)) => {
                if events.log(LogLevel::Warning, line).await.is_err() {
                    break;
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read engine stderr: {}", e);
                let _ = events
                    .log(LogLevel::Error, format!("Failed to read engine stderr: {e}"))
                    .await;
                break;
            }
        }
    }
    discard_rest(&mut reader).await;
}

/// Relay one stdout line. Returns `false` if shutdown fired while the engine
/// waited on the user.
async fn forward(
    line: &str,
    events: &EngineEvents,
    stdin: &mut ChildStdin,
    shutdown: &mut ShutdownSignal,
) -> Result<bool> {
    if line.trim().is_empty() {
        return Ok(true);
    }

    match serde_json::from_str::<WireEvent>(line) {
        Ok(WireEvent::Log { level, message }) => {
            let level = level.as_deref().map(LogLevel::parse_lenient).unwrap_or_default();
            events.log(level, message).await?;
        }
        Ok(WireEvent::Sentiment { ticker, score }) => {
            events.sentiment(ticker, score).await?;
        }
        Ok(WireEvent::Prompt { message }) => {
            tokio::select! {
                answer = events.prompt(message) => write_line(stdin, &answer?).await?,
                _ = shutdown.triggered() => return Ok(false),
            }
        }
        Err(_) => events.info(line).await?,
    }
    Ok(true)
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineEvent;
    use crate::form::{Field, FormState, validate};
    use tokio::sync::{mpsc, watch};
    use tokio::task::JoinHandle;

    fn config() -> ValidConfig {
        let form = FormState::new()
            .with(Field::Login, "12345")
            .with(Field::Password, "pw")
            .with(Field::Server, "srv-Demo")
            .with(Field::Tickers, "EURUSD:EURUSD=X");
        validate(&form).unwrap()
    }

    struct Running {
        events: mpsc::Receiver<EngineEvent>,
        stop: watch::Sender<bool>,
        task: JoinHandle<Result<()>>,
    }

    fn spawn_engine(engine: ProcessEngine) -> Running {
        let (tx, events) = mpsc::channel(32);
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            engine
                .run(config(), EngineEvents::new(tx), ShutdownSignal::new(stop_rx))
                .await
        });
        Running { events, stop, task }
    }

    #[cfg(unix)]
    fn script(body: &str) -> ProcessEngine {
        ProcessEngine::new("sh", vec!["-c".into(), body.into()])
    }

    #[cfg(unix)]
    async fn drain(running: &mut Running) -> Vec<(LogLevel, String)> {
        let mut lines = Vec::new();
        while let Some(event) = running.events.recv().await {
            match event {
                EngineEvent::Log(line) => lines.push((line.level, line.message)),
                EngineEvent::Sentiment(sample) => {
                    lines.push((LogLevel::Debug, format!("{}={}", sample.ticker, sample.score)))
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        lines
    }

    #[tokio::test]
    async fn test_stop_before_launch_spawns_nothing() {
        let (tx, _events) = mpsc::channel(1);
        let (_stop, stop_rx) = watch::channel(true);
        // Would fail to spawn if it got that far.
        let result = ProcessEngine::new("/definitely/not/an/engine", Vec::new())
            .run(config(), EngineEvents::new(tx), ShutdownSignal::new(stop_rx))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_wire_event_parsing() {
        let event: WireEvent =
            serde_json::from_str(r#"{"event":"sentiment","ticker":"AAPL","score":-0.25}"#).unwrap();
        assert_eq!(
            event,
            WireEvent::Sentiment {
                ticker: "AAPL".into(),
                score: -0.25
            }
        );

        let event: WireEvent = serde_json::from_str(r#"{"event":"log","message":"hi"}"#).unwrap();
        assert_eq!(
            event,
            WireEvent::Log {
                level: None,
                message: "hi".into()
            }
        );

        assert!(serde_json::from_str::<WireEvent>(r#"{"event":"order"}"#).is_err());
    }

    #[test]
    fn test_start_request_shape() {
        let config = config();
        let request = StartRequest {
            config: &config,
            max_trades: config.max_trades(),
            account: config.broker.account_label(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["account"], "12345@srv");
        assert_eq!(json["max_trades"], 100);
        assert_eq!(json["broker"]["login"], 12345);
        assert_eq!(json["symbols"]["EURUSD"], "EURUSD=X");
    }

    #[tokio::test]
    async fn test_missing_program_is_engine_error() {
        let mut running = spawn_engine(ProcessEngine::new("  ", Vec::new()));
        let err = running.task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert!(running.events.recv().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_forwards_stdout_and_stderr() {
        let mut running = spawn_engine(script(
            r#"read cfg
case "$cfg" in *'"account":"12345@srv"'*) echo '{"event":"log","level":"warning","message":"config ok"}';; esac
echo 'plain output'
echo '{"event":"sentiment","ticker":"EURUSD=X","score":0.5}'
echo 'traceback line' >&2"#,
        ));

        let lines = drain(&mut running).await;
        assert!(running.task.await.unwrap().is_ok());

        assert!(lines.contains(&(LogLevel::Warning, "config ok".into())));
        assert!(lines.contains(&(LogLevel::Info, "plain output".into())));
        assert!(lines.contains(&(LogLevel::Debug, "EURUSD=X=0.5".into())));
        assert!(lines.contains(&(LogLevel::Warning, "traceback line".into())));

        let stdout_order: Vec<_> = lines
            .iter()
            .filter(|(_, m)| m != "traceback line")
            .map(|(_, m)| m.as_str())
            .collect();
        assert_eq!(stdout_order, ["config ok", "plain output", "EURUSD=X=0.5"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_prompt_answer_written_to_stdin() {
        let mut running = spawn_engine(script(
            r#"read cfg
echo '{"event":"prompt","message":"Continue? [y/n]"}'
read answer
echo "answer=$answer""#,
        ));

        let Some(EngineEvent::Prompt(prompt)) = running.events.recv().await else {
            panic!("expected a prompt");
        };
        assert_eq!(prompt.message, "Continue? [y/n]");
        prompt.answer("y").unwrap();

        let Some(EngineEvent::Log(line)) = running.events.recv().await else {
            panic!("expected the echoed answer");
        };
        assert_eq!(line.message, "answer=y");
        assert!(running.task.await.unwrap().is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_engine_error() {
        let running = spawn_engine(script("read cfg; echo 'Login failed' >&2; exit 3"));
        let err = running.task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Engine(ref msg) if msg.contains("exit")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_utf8_stdout_is_logged_lossily() {
        let mut running = spawn_engine(script(
            r#"read cfg
printf 'caf\351 price\r\n'
echo after
echo '{"event":"sentiment","ticker":"EURUSD=X","score":-0.25}'"#,
        ));

        let lines = drain(&mut running).await;
        assert!(running.task.await.unwrap().is_ok());
        assert_eq!(
            lines,
            [
                (LogLevel::Info, "caf\u{FFFD} price".to_string()),
                (LogLevel::Info, "after".to_string()),
                (LogLevel::Debug, "EURUSD=X=-0.25".to_string()),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_utf8_stderr_keeps_later_lines() {
        let mut running = spawn_engine(script(
            r#"read cfg
printf 'bad\351\n' >&2
echo 'Traceback: login failed' >&2
exit 2"#,
        ));

        let lines = drain(&mut running).await;
        let err = running.task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Engine(ref msg) if msg.contains("exit status: 2")));
        assert_eq!(
            lines,
            [
                (LogLevel::Warning, "bad\u{FFFD}".to_string()),
                (LogLevel::Warning, "Traceback: login failed".to_string()),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_startup_crash_reports_status_and_stderr() {
        let mut running = spawn_engine(script(
            "exec 0<&-; echo 'ImportError: no module named MetaTrader5' >&2; exit 4",
        ));

        let lines = drain(&mut running).await;
        let err = running.task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Engine(ref msg) if msg.contains("exit status: 4")));
        assert_eq!(
            lines,
            [(LogLevel::Warning, "ImportError: no module named MetaTrader5".to_string())]
        );
    }

    #[tokio::test]
    async fn test_next_line_decodes_lossily() {
        let mut reader = BufReader::new(&b"ok\r\nbad\xff\nlast"[..]);
        assert_eq!(next_line(&mut reader).await.unwrap().as_deref(), Some("ok"));
        assert_eq!(next_line(&mut reader).await.unwrap().as_deref(), Some("bad\u{FFFD}"));
        assert_eq!(next_line(&mut reader).await.unwrap().as_deref(), Some("last"));
        assert_eq!(next_line(&mut reader).await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shutdown_kills_child() {
        let running = spawn_engine(script("read cfg; echo started; exec sleep 30"));
        let mut events = running.events;
        assert!(matches!(events.recv().await, Some(EngineEvent::Log(_))));

        running.stop.send(true).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), running.task)
            .await
            .expect("engine stops promptly")
            .unwrap();
        assert!(result.is_ok());
    }
}
