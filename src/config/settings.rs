//! Configuration settings for Strader.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// External engine configuration.
    pub engine: EngineSettings,
    /// UI configuration.
    pub ui: UiConfig,
    /// Default credential and ticker files.
    pub files: FileConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
}

impl Settings {
    /// Load configuration from file.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::config(e.to_string()))
        } else {
            tracing::debug!(path = %config_path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file. Returns the path written.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<PathBuf> {
        let config_path = path.unwrap_or_else(default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }
}

fn default_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// External engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Program launched for each session.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory for the program.
    pub working_dir: Option<PathBuf>,
    /// Capacity of the engine event channel.
    pub event_capacity: usize,
    /// How long a stopping engine may take before it is aborted.
    pub stop_grace_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            working_dir: None,
            event_capacity: 256,
            stop_grace_ms: 3000,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Lines kept in the log panel.
    pub max_log_lines: usize,
    /// Show help bar.
    pub show_help_bar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: true,
            max_log_lines: 1000,
            show_help_bar: true,
        }
    }
}

/// Files pre-filled into the form at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub broker_credentials: Option<PathBuf>,
    pub api_credentials: Option<PathBuf>,
    pub tickers: Option<PathBuf>,
}

/// Key bindings configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Previous field.
    pub up: String,
    /// Next field.
    pub down: String,
    /// Previous choice.
    pub left: String,
    /// Next choice.
    pub right: String,
    /// Edit, toggle or load the selected field.
    pub select: String,
    /// Cancel/back.
    pub back: String,
    /// Validate the form and start the engine.
    pub submit: String,
    /// Stop the engine.
    pub stop: String,
    /// Restore form defaults.
    pub reset: String,
    /// Load broker credentials from the broker file.
    pub load_broker: String,
    /// Load API credentials from the API file.
    pub load_api: String,
    /// Load tickers from the tickers file.
    pub load_tickers: String,
    /// Clear the log panel.
    pub clear_log: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            left: "h".to_string(),
            right: "l".to_string(),
            select: "Enter".to_string(),
            back: "Esc".to_string(),
            submit: "s".to_string(),
            stop: "x".to_string(),
            reset: "Ctrl+r".to_string(),
            load_broker: "b".to_string(),
            load_api: "a".to_string(),
            load_tickers: "t".to_string(),
            clear_log: "c".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.engine.event_capacity, 256);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[engine]\nprogram = \"python\"\nargs = [\"-m\", \"trader\"]\n\n[ui]\nmax_log_lines = 50\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path)).unwrap();
        assert_eq!(settings.engine.program, "python");
        assert_eq!(settings.engine.args, vec!["-m", "trader"]);
        assert_eq!(settings.engine.stop_grace_ms, 3000);
        assert_eq!(settings.ui.max_log_lines, 50);
        assert_eq!(settings.ui.tick_rate_ms, 250);
        assert_eq!(settings.keybindings, KeyBindings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.files.tickers = Some(PathBuf::from("/tmp/tickers.txt"));
        settings.save(Some(path.clone())).unwrap();

        assert_eq!(Settings::load(Some(path)).unwrap(), settings);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine\nprogram = 1").unwrap();

        let err = Settings::load(Some(path)).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
