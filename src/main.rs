//! Strader - terminal configuration shell for a sentiment-driven MT5
//! trading engine.

use anyhow::Context;
use clap::Parser;
use strader::{App, Cli, Settings, config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::load(cli.config.clone()).context("failed to load settings")?;
    cli.apply(&mut settings);

    if cli.save_config {
        let path = settings
            .save(cli.config.clone())
            .context("failed to save settings")?;
        println!("Settings written to {}", path.display());
        return Ok(());
    }

    // The TUI owns the terminal, so logs go to a file
    let _guard = init_logging().context("failed to set up logging")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting strader");

    // Run the application
    let mut app = App::new(settings)?;
    app.run().await?;

    tracing::info!("Exiting");
    Ok(())
}

fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_dir = config::log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("cannot create {}", log_dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "strader.log"));

    let filter = EnvFilter::try_from_env("STRADER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "strader=info".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}
