//! Command-line arguments.

use crate::config::Settings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, Default)]
#[command(
    name = "strader",
    version,
    about = "Terminal configuration shell for a sentiment-driven MT5 trading engine"
)]
pub struct Cli {
    /// Settings file (defaults to config.toml in the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Broker credentials file loaded at startup
    #[arg(long, value_name = "PATH")]
    pub broker_file: Option<PathBuf>,

    /// API credentials file loaded at startup
    #[arg(long, value_name = "PATH")]
    pub api_file: Option<PathBuf>,

    /// Ticker mapping file loaded at startup
    #[arg(long, value_name = "PATH")]
    pub tickers_file: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit
    #[arg(long)]
    pub save_config: bool,
}

impl Cli {
    /// Let file arguments take precedence over the settings file.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.broker_file {
            settings.files.broker_credentials = Some(path.clone());
        }
        if let Some(path) = &self.api_file {
            settings.files.api_credentials = Some(path.clone());
        }
        if let Some(path) = &self.tickers_file {
            settings.files.tickers = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_required() {
        let cli = Cli::try_parse_from(["strader"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.broker_file.is_none());
        assert!(!cli.save_config);
    }

    #[test]
    fn test_save_config_writes_overridden_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "strader",
            "--config",
            path.to_str().unwrap(),
            "--api-file",
            "api.ini",
            "--save-config",
        ])
        .unwrap();
        assert!(cli.save_config);

        let mut settings = Settings::load(cli.config.clone()).unwrap();
        cli.apply(&mut settings);
        assert_eq!(settings.save(cli.config.clone()).unwrap(), path);

        let reloaded = Settings::load(Some(path)).unwrap();
        assert_eq!(reloaded.files.api_credentials, Some(PathBuf::from("api.ini")));
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_file_arguments_override_settings() {
        let cli = Cli::try_parse_from([
            "strader",
            "--broker-file",
            "/etc/strader/mt5.ini",
            "--tickers-file",
            "tickers.txt",
        ])
        .unwrap();

        let mut settings = Settings::default();
        settings.files.api_credentials = Some(PathBuf::from("api.ini"));
        cli.apply(&mut settings);

        assert_eq!(
            settings.files.broker_credentials,
            Some(PathBuf::from("/etc/strader/mt5.ini"))
        );
        assert_eq!(settings.files.api_credentials, Some(PathBuf::from("api.ini")));
        assert_eq!(settings.files.tickers, Some(PathBuf::from("tickers.txt")));
    }

    #[test]
    fn test_unknown_argument_rejected() {
        assert!(Cli::try_parse_from(["strader", "--login", "1"]).is_err());
    }
}
