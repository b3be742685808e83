//! The configuration form.
//!
//! Every input is kept as raw text in a [`FormState`] until submission, when
//! [`validate`] turns it into a [`ValidConfig`] or a list of [`FieldError`]s.

mod params;
mod tickers;
mod validate;

pub use params::{
    EngineParameters, StrategyParameters, SymbolType, Timeframe, TradingPeriod,
};
pub use tickers::{TickerError, TickerMap, TickerMapping, parse_tickers};
pub use validate::{FieldError, ValidConfig, validate};

use crate::credentials::{ApiCredentials, BrokerSection};
use std::collections::HashMap;

/// Form section a field is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Terminal,
    Api,
    Strategy,
    Engine,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Terminal => "MT5 TERMINAL",
            Self::Api => "API CREDENTIALS",
            Self::Strategy => "STRATEGY",
            Self::Engine => "TRADING ENGINE",
        }
    }
}

/// How a field is edited and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Free text, masked when rendered.
    Secret,
    /// Path to a file loaded on demand.
    Path,
    /// On/off switch.
    Toggle,
    /// One of a fixed list of values.
    Choice(&'static [&'static str]),
}

/// Every input on the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    BrokerFile,
    TerminalPath,
    Login,
    Password,
    Server,
    ApiFile,
    RedditClientId,
    RedditClientSecret,
    RedditUserAgent,
    FmpApiKey,
    TickersFile,
    Tickers,
    SymbolType,
    Threshold,
    MaxPositions,
    ExpectedReturn,
    Timeframe,
    StartTime,
    FinishingTime,
    EndingTime,
    IterationTime,
    DailyRisk,
    MaxRisk,
    MoneyManagement,
    AutoTrade,
    DebugMode,
    Notify,
    Period,
}

impl Field {
    pub const ALL: [Field; 28] = [
        Field::BrokerFile,
        Field::TerminalPath,
        Field::Login,
        Field::Password,
        Field::Server,
        Field::ApiFile,
        Field::RedditClientId,
        Field::RedditClientSecret,
        Field::RedditUserAgent,
        Field::FmpApiKey,
        Field::TickersFile,
        Field::Tickers,
        Field::SymbolType,
        Field::Threshold,
        Field::MaxPositions,
        Field::ExpectedReturn,
        Field::Timeframe,
        Field::StartTime,
        Field::FinishingTime,
        Field::EndingTime,
        Field::IterationTime,
        Field::DailyRisk,
        Field::MaxRisk,
        Field::MoneyManagement,
        Field::AutoTrade,
        Field::DebugMode,
        Field::Notify,
        Field::Period,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BrokerFile => "Credentials File",
            Self::TerminalPath => "Terminal Path",
            Self::Login => "Login",
            Self::Password => "Password",
            Self::Server => "Server",
            Self::ApiFile => "API Keys File",
            Self::RedditClientId => "Reddit Client ID",
            Self::RedditClientSecret => "Reddit Client Secret",
            Self::RedditUserAgent => "Reddit User Agent",
            Self::FmpApiKey => "FMP API Key",
            Self::TickersFile => "Tickers File",
            Self::Tickers => "Tickers",
            Self::SymbolType => "Symbol Type",
            Self::Threshold => "Sentiment Threshold",
            Self::MaxPositions => "Max Positions",
            Self::ExpectedReturn => "Expected Return (%)",
            Self::Timeframe => "Time Frame",
            Self::StartTime => "Starting Time (HH:MM)",
            Self::FinishingTime => "Finishing Time (HH:MM)",
            Self::EndingTime => "Ending Time (HH:MM)",
            Self::IterationTime => "Iteration Time (min)",
            Self::DailyRisk => "Risk/trade (%)",
            Self::MaxRisk => "Max Risk (%)",
            Self::MoneyManagement => "Enable MM",
            Self::AutoTrade => "Enable Auto Trade",
            Self::DebugMode => "Enable Debugging",
            Self::Notify => "Enable Notifications",
            Self::Period => "Trading Period",
        }
    }

    pub fn section(&self) -> Section {
        match self {
            Self::BrokerFile | Self::TerminalPath | Self::Login | Self::Password | Self::Server => {
                Section::Terminal
            }
            Self::ApiFile
            | Self::RedditClientId
            | Self::RedditClientSecret
            | Self::RedditUserAgent
            | Self::FmpApiKey => Section::Api,
            Self::TickersFile
            | Self::Tickers
            | Self::SymbolType
            | Self::Threshold
            | Self::MaxPositions
            | Self::ExpectedReturn => Section::Strategy,
            _ => Section::Engine,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::BrokerFile | Self::ApiFile | Self::TickersFile => FieldKind::Path,
            Self::Password
            | Self::RedditClientId
            | Self::RedditClientSecret
            | Self::RedditUserAgent
            | Self::FmpApiKey => FieldKind::Secret,
            Self::MoneyManagement | Self::AutoTrade | Self::DebugMode | Self::Notify => {
                FieldKind::Toggle
            }
            Self::SymbolType => FieldKind::Choice(&SymbolType::NAMES),
            Self::Timeframe => FieldKind::Choice(&Timeframe::NAMES),
            Self::Period => FieldKind::Choice(&TradingPeriod::NAMES),
            _ => FieldKind::Text,
        }
    }

    /// Value the field holds on a fresh or reset form.
    pub fn default_value(&self) -> &'static str {
        match self {
            Self::SymbolType => SymbolType::default().as_str(),
            Self::Threshold => "0.2",
            Self::MaxPositions => "100",
            Self::ExpectedReturn => "5.0",
            Self::Timeframe => Timeframe::default().as_str(),
            Self::StartTime => "00:00",
            Self::FinishingTime | Self::EndingTime => "23:59",
            Self::IterationTime => "15",
            Self::DailyRisk => "0.01",
            Self::MaxRisk => "10.0",
            Self::MoneyManagement | Self::AutoTrade | Self::DebugMode | Self::Notify => "false",
            Self::Period => TradingPeriod::default().as_str(),
            _ => "",
        }
    }

    /// Whether the field accepts typed text.
    pub fn is_editable(&self) -> bool {
        matches!(
            self.kind(),
            FieldKind::Text | FieldKind::Secret | FieldKind::Path
        )
    }

    /// Position of the field in [`Field::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Raw, unvalidated form contents.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: HashMap<Field, String>,
}

impl Default for FormState {
    fn default() -> Self {
        let values = Field::ALL
            .iter()
            .map(|field| (*field, field.default_value().to_string()))
            .collect();
        Self { values }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Builder-style [`FormState::set`].
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_on(&self, field: Field) -> bool {
        self.get(field).trim().eq_ignore_ascii_case("true")
    }

    /// Flip a toggle field. Other kinds are left alone.
    pub fn toggle(&mut self, field: Field) {
        if field.kind() == FieldKind::Toggle {
            let next = if self.is_on(field) { "false" } else { "true" };
            self.set(field, next);
        }
    }

    /// Step a choice field to its next (or previous) option, wrapping around.
    pub fn cycle(&mut self, field: Field, forward: bool) {
        let FieldKind::Choice(options) = field.kind() else {
            return;
        };
        let current = options.iter().position(|o| *o == self.get(field));
        let len = options.len();
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, _) => 0,
        };
        self.set(field, options[next]);
    }

    /// Restore defaults, discarding all entered credentials.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace the broker fields with values from a credential file.
    ///
    /// Keys absent from the file become blank. The terminal path is only
    /// replaced when the file carries one.
    pub fn apply_broker_credentials(&mut self, section: &BrokerSection) {
        self.set(Field::Login, section.login.trim());
        self.set(Field::Password, section.password.trim());
        self.set(Field::Server, section.server.trim());
        if !section.path.trim().is_empty() {
            self.set(Field::TerminalPath, section.path.trim());
        }
    }

    /// Replace the API fields with values from a credential file.
    pub fn apply_api_credentials(&mut self, api: &ApiCredentials) {
        self.set(Field::RedditClientId, api.reddit_client_id.trim());
        self.set(Field::RedditClientSecret, api.reddit_client_secret.trim());
        self.set(Field::RedditUserAgent, api.reddit_user_agent.trim());
        self.set(Field::FmpApiKey, api.fmp_api_key.trim());
    }

    pub fn set_tickers(&mut self, tickers: impl Into<String>) {
        self.set(Field::Tickers, tickers);
    }
}
