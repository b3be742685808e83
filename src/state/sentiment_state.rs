//! Latest sentiment per ticker.

use crate::engine::SentimentSample;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Default chart threshold before any session has run.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// One bar of the sentiment chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentBar<'a> {
    pub ticker: &'a str,
    pub score: f64,
}

/// Latest sentiment score per ticker. No history is kept.
#[derive(Debug, Clone)]
pub struct SentimentState {
    samples: HashMap<String, SentimentSample>,
    /// Threshold of the session producing the samples.
    pub threshold: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for SentimentState {
    fn default() -> Self {
        Self {
            samples: HashMap::new(),
            threshold: DEFAULT_THRESHOLD,
            last_updated: None,
        }
    }
}

impl SentimentState {
    /// Replace the score for the sample's ticker.
    pub fn update(&mut self, sample: SentimentSample) {
        self.last_updated = Some(sample.timestamp);
        self.samples.insert(sample.ticker.clone(), sample);
    }

    pub fn score(&self, ticker: &str) -> Option<f64> {
        self.samples.get(ticker).map(|s| s.score)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop all scores and chart against a new threshold.
    pub fn reset(&mut self, threshold: f64) {
        self.samples.clear();
        self.threshold = threshold;
        self.last_updated = None;
    }

    /// Bars worth charting: |score| at least half the threshold, highest
    /// score first.
    pub fn chart_bars(&self) -> Vec<SentimentBar<'_>> {
        let cutoff = self.threshold / 2.0;
        let mut bars: Vec<_> = self
            .samples
            .values()
            .filter(|s| s.score.abs() >= cutoff)
            .map(|s| SentimentBar {
                ticker: &s.ticker,
                score: s.score,
            })
            .collect();
        bars.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.ticker.cmp(b.ticker)));
        bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(threshold: f64, scores: &[(&str, f64)]) -> SentimentState {
        let mut state = SentimentState::default();
        state.reset(threshold);
        for (ticker, score) in scores {
            state.update(SentimentSample::new(*ticker, *score));
        }
        state
    }

    #[test]
    fn test_update_keeps_latest_only() {
        let state = state(0.2, &[("AAPL", 0.1), ("AAPL", -0.6)]);
        assert_eq!(state.len(), 1);
        assert_eq!(state.score("AAPL"), Some(-0.6));
        assert!(state.last_updated.is_some());
    }

    #[test]
    fn test_chart_filters_and_sorts() {
        let state = state(
            0.4,
            &[("AAPL", 0.3), ("TSLA", -0.5), ("MSFT", 0.1), ("NVDA", 0.9), ("EURUSD=X", -0.2)],
        );
        let bars: Vec<_> = state
            .chart_bars()
            .into_iter()
            .map(|b| (b.ticker, b.score))
            .collect();
        assert_eq!(
            bars,
            vec![("NVDA", 0.9), ("AAPL", 0.3), ("EURUSD=X", -0.2), ("TSLA", -0.5)]
        );
    }

    #[test]
    fn test_reset_clears_scores() {
        let mut state = state(0.2, &[("AAPL", 0.5)]);
        state.reset(0.6);
        assert!(state.is_empty());
        assert_eq!(state.threshold, 0.6);
        assert!(state.chart_bars().is_empty());
    }
}
