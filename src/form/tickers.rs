//! Broker ↔ data-provider ticker mappings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A problem found while parsing ticker mappings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("at least one BROKER:PROVIDER mapping is required")]
    Empty,
    #[error("malformed ticker pair '{0}', expected BROKER:PROVIDER")]
    Malformed(String),
    #[error("duplicate broker ticker '{0}'")]
    Duplicate(String),
}

/// One broker-side symbol and its data-provider counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMapping {
    pub broker: String,
    pub provider: String,
}

impl TickerMapping {
    /// Parse a single `BROKER:PROVIDER` entry.
    pub fn parse(entry: &str) -> Result<Self, TickerError> {
        let compact: String = entry.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.split_once(':') {
            Some((broker, provider))
                if !broker.is_empty() && !provider.is_empty() && !provider.contains(':') =>
            {
                Ok(Self {
                    broker: broker.to_string(),
                    provider: provider.to_string(),
                })
            }
            _ => Err(TickerError::Malformed(compact)),
        }
    }
}

/// Ticker mappings keyed by broker ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerMap(BTreeMap<String, String>);

impl TickerMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Provider ticker mapped to a broker ticker.
    pub fn provider_for(&self, broker: &str) -> Option<&str> {
        self.0.get(broker).map(String::as_str)
    }

    /// Broker ticker that maps to a provider ticker.
    pub fn broker_for(&self, provider: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, p)| p.as_str() == provider)
            .map(|(b, _)| b.as_str())
    }

    pub fn broker_symbols(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = TickerMapping> + '_ {
        self.0.iter().map(|(broker, provider)| TickerMapping {
            broker: broker.clone(),
            provider: provider.clone(),
        })
    }
}

/// Parse mappings separated by commas or newlines.
///
/// Whitespace is ignored and a trailing separator is allowed. Every problem
/// is reported, not just the first.
pub fn parse_tickers(input: &str) -> Result<TickerMap, Vec<TickerError>> {
    let mut map = BTreeMap::new();
    let mut errors = Vec::new();

    let entries = input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty());

    for entry in entries {
        match TickerMapping::parse(entry) {
            Ok(mapping) => {
                if map.contains_key(&mapping.broker) {
                    let duplicate = TickerError::Duplicate(mapping.broker);
                    if !errors.contains(&duplicate) {
                        errors.push(duplicate);
                    }
                } else {
                    map.insert(mapping.broker, mapping.provider);
                }
            }
            Err(e) => errors.push(e),
        }
    }

    if map.is_empty() && errors.is_empty() {
        errors.push(TickerError::Empty);
    }

    if errors.is_empty() {
        Ok(TickerMap(map))
    } else {
        Err(errors)
    }
}
