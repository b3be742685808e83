//! # Strader - MT5 sentiment trading configuration shell
//!
//! A terminal user interface that collects broker credentials, API keys and
//! strategy parameters, validates them, and hands them to an external
//! trading/sentiment engine whose log and sentiment output it displays.
//!
//! ## Architecture
//!
//! - **App**: Core application state and lifecycle management
//! - **Form**: Raw form values and their validation
//! - **Credentials**: Credential records and INI credential files
//! - **Engine**: The bridge to the external engine process
//! - **State**: Centralized state management
//! - **Events**: Input handling
//! - **UI**: Layout and rendering logic
//! - **Config**: Configuration management

pub mod app;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod events;
pub mod form;
pub mod state;
pub mod ui;

pub use app::App;
pub use cli::Cli;
pub use config::Settings;
pub use engine::{EngineBridge, EngineHandle, TradingEngine, TradingSession};
pub use error::{Error, Result};
pub use form::{FormState, ValidConfig, validate};
