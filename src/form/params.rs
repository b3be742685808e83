//! Strategy and engine parameter records.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Asset class whose sentiment lexicon the engine scores with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    #[default]
    Stock,
    Etf,
    Future,
    Forex,
    Crypto,
    Index,
}

impl SymbolType {
    pub const ALL: [SymbolType; 6] = [
        Self::Stock,
        Self::Etf,
        Self::Future,
        Self::Forex,
        Self::Crypto,
        Self::Index,
    ];
    pub const NAMES: [&'static str; 6] = ["stock", "etf", "future", "forex", "crypto", "index"];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES[*self as usize]
    }
}

impl FromStr for SymbolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::NAMES, &Self::ALL, s)
    }
}

impl std::fmt::Display for SymbolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bar timeframe the engine iterates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "2m")]
    M2,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "4m")]
    M4,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "6m")]
    M6,
    #[serde(rename = "10m")]
    M10,
    #[serde(rename = "12m")]
    M12,
    #[default]
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "20m")]
    M20,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "3h")]
    H3,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "D1")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 19] = [
        Self::M1,
        Self::M2,
        Self::M3,
        Self::M4,
        Self::M5,
        Self::M6,
        Self::M10,
        Self::M12,
        Self::M15,
        Self::M20,
        Self::M30,
        Self::H1,
        Self::H2,
        Self::H3,
        Self::H4,
        Self::H6,
        Self::H8,
        Self::H12,
        Self::D1,
    ];
    pub const NAMES: [&'static str; 19] = [
        "1m", "2m", "3m", "4m", "5m", "6m", "10m", "12m", "15m", "20m", "30m", "1h", "2h", "3h",
        "4h", "6h", "8h", "12h", "D1",
    ];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES[*self as usize]
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::NAMES, &Self::ALL, s)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Calendar window after which the engine closes out and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TradingPeriod {
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "24/7")]
    AlwaysOn,
}

impl TradingPeriod {
    pub const ALL: [TradingPeriod; 4] = [Self::Month, Self::Week, Self::Day, Self::AlwaysOn];
    pub const NAMES: [&'static str; 4] = ["month", "week", "day", "24/7"];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES[*self as usize]
    }
}

impl FromStr for TradingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(&Self::NAMES, &Self::ALL, s)
    }
}

impl std::fmt::Display for TradingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn lookup<T: Copy>(names: &[&str], values: &[T], s: &str) -> Result<T, String> {
    names
        .iter()
        .position(|name| *name == s.trim())
        .map(|i| values[i])
        .ok_or_else(|| format!("must be one of {}", names.join(", ")))
}

/// Options that shape how the engine turns sentiment into signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameters {
    /// Lexicon and asset class used for scoring.
    pub symbol_type: SymbolType,
    /// Minimum |score| required to emit a signal.
    pub threshold: f64,
    /// Maximum number of simultaneously open positions.
    pub max_positions: u32,
    /// Return (%) at which open positions are considered for exit.
    pub expected_return: f64,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            symbol_type: SymbolType::default(),
            threshold: 0.2,
            max_positions: 100,
            expected_return: 5.0,
        }
    }
}

/// Schedule and risk settings for the execution loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParameters {
    pub timeframe: Timeframe,
    /// Time of day new sessions may begin.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Time of day after which no new entries are opened.
    #[serde(with = "hhmm")]
    pub finishing_time: NaiveTime,
    /// Time of day at which all positions are closed.
    #[serde(with = "hhmm")]
    pub ending_time: NaiveTime,
    /// Minutes between engine iterations.
    pub iteration_minutes: u32,
    /// Risk per trade, in percent.
    pub daily_risk: f64,
    /// Maximum account risk, in percent.
    pub max_risk: f64,
    pub money_management: bool,
    pub auto_trade: bool,
    pub debug_mode: bool,
    pub notify: bool,
    pub period: TradingPeriod,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            start_time: NaiveTime::MIN,
            finishing_time: end_of_day(),
            ending_time: end_of_day(),
            iteration_minutes: 15,
            daily_risk: 0.01,
            max_risk: 10.0,
            money_management: false,
            auto_trade: false,
            debug_mode: false,
            notify: false,
            period: TradingPeriod::default(),
        }
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// `HH:MM` wire format for times of day.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s.trim(), FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM time '{s}'")))
    }
}
