//! Credential records and the INI files they are loaded from.
//!
//! A credential file carries two sections:
//!
//! ```ini
//! [MT5]
//! login = 12345
//! password = secret
//! server = Broker-Demo
//!
//! [API]
//! reddit_client_id = ...
//! reddit_client_secret = ...
//! reddit_user_agent = ...
//! fmp_api = ...
//! ```
//!
//! Keys missing from a section load as blank strings instead of failing.
//! Values are taken as written, so backslashes and quotes in passwords or
//! Windows paths survive.

use crate::error::{Error, Result};
use ini::{Ini, ParseOption, Properties};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

const REDACTED: &str = "***";

/// Broker section of a credential file, as written.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BrokerSection {
    pub login: String,
    pub password: String,
    pub server: String,
    /// Optional path to the terminal executable.
    pub path: String,
}

impl fmt::Debug for BrokerSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerSection")
            .field("login", &self.login)
            .field("password", &redact(&self.password))
            .field("server", &self.server)
            .field("path", &self.path)
            .finish()
    }
}

/// Social-media and market-data API keys.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiCredentials {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    #[serde(rename = "fmp_api")]
    pub fmp_api_key: String,
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("reddit_client_id", &redact(&self.reddit_client_id))
            .field("reddit_client_secret", &redact(&self.reddit_client_secret))
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("fmp_api_key", &redact(&self.fmp_api_key))
            .finish()
    }
}

/// Validated broker account credentials.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct BrokerCredentials {
    pub login: u64,
    pub password: String,
    pub server: String,
    #[serde(rename = "path", skip_serializing_if = "Option::is_none")]
    pub terminal_path: Option<PathBuf>,
}

impl BrokerCredentials {
    /// Account label of the form `login@server`, where the server name is cut
    /// at its first `-` (`Broker-Demo` becomes `Broker`).
    pub fn account_label(&self) -> String {
        let server = self.server.split('-').next().unwrap_or_default();
        format!("{}@{}", self.login, server)
    }
}

impl fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("login", &self.login)
            .field("password", &redact(&self.password))
            .field("server", &self.server)
            .field("terminal_path", &self.terminal_path)
            .finish()
    }
}

fn redact(value: &str) -> &str {
    if value.is_empty() { "" } else { REDACTED }
}

/// Parsed contents of a credential file.
///
/// A section is `None` when the file does not contain it at all.
#[derive(Debug, Clone, Default)]
pub struct CredentialFile {
    pub broker: Option<BrokerSection>,
    pub api: Option<ApiCredentials>,
}

impl CredentialFile {
    /// Load and parse an INI credential file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::credential_file(path, "file not found"));
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| Error::credential_file(path, e.to_string()))?;
        let file =
            Self::parse(&content).map_err(|e| Error::credential_file(path, e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            broker = file.broker.is_some(),
            api = file.api.is_some(),
            "Loaded credential file"
        );
        Ok(file)
    }

    /// Parse INI text. Section and key names match case-insensitively.
    pub fn parse(content: &str) -> std::result::Result<Self, ini::ParseError> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)?;

        let broker = section(&ini, "MT5").map(|props| BrokerSection {
            login: value(props, "login"),
            password: value(props, "password"),
            server: value(props, "server"),
            path: value(props, "path"),
        });
        let api = section(&ini, "API").map(|props| ApiCredentials {
            reddit_client_id: value(props, "reddit_client_id"),
            reddit_client_secret: value(props, "reddit_client_secret"),
            reddit_user_agent: value(props, "reddit_user_agent"),
            fmp_api_key: value(props, "fmp_api"),
        });

        Ok(Self { broker, api })
    }
}

fn section<'a>(ini: &'a Ini, name: &str) -> Option<&'a Properties> {
    ini.iter()
        .find(|(section, _)| section.is_some_and(|s| s.trim().eq_ignore_ascii_case(name)))
        .map(|(_, props)| props)
}

fn value(props: &Properties, key: &str) -> String {
    props
        .iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default()
}

/// Read a ticker mapping file verbatim.
pub fn load_tickers_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .map(|content| content.trim().to_string())
        .map_err(|e| Error::credential_file(path, e.to_string()))
}
