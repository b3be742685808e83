//! Log panel state.

use crate::engine::LogLine;
use std::collections::VecDeque;

pub const DEFAULT_MAX_LINES: usize = 1000;

/// Bounded log of engine and application messages, in arrival order.
#[derive(Debug, Clone)]
pub struct LogState {
    lines: VecDeque<LogLine>,
    capacity: usize,
    /// Lines scrolled back from the newest. Zero follows the tail.
    offset: usize,
}

impl Default for LogState {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_LINES)
    }
}

impl LogState {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_MAX_LINES)),
            capacity,
            offset: 0,
        }
    }

    /// Append a line, evicting the oldest once full.
    pub fn push(&mut self, line: LogLine) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        // Keep a scrolled-back view on the same lines.
        if self.offset > 0 {
            self.offset = (self.offset + 1).min(self.lines.len() - 1);
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.offset = 0;
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    pub fn is_following(&self) -> bool {
        self.offset == 0
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = self.lines.len().saturating_sub(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = 0;
    }

    /// The lines that fit in a panel `height` rows tall at the current scroll.
    pub fn visible(&self, height: usize) -> impl Iterator<Item = &LogLine> {
        let end = self.lines.len().saturating_sub(self.offset);
        let start = end.saturating_sub(height);
        self.lines.range(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages<'a>(lines: impl Iterator<Item = &'a LogLine>) -> Vec<&'a str> {
        lines.map(|l| l.message.as_str()).collect()
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut log = LogState::with_capacity(3);
        for i in 0..5 {
            log.push(LogLine::info(format!("line {i}")));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(messages(log.lines()), ["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_visible_follows_tail() {
        let mut log = LogState::with_capacity(10);
        for i in 0..6 {
            log.push(LogLine::info(format!("line {i}")));
        }
        assert_eq!(messages(log.visible(2)), ["line 4", "line 5"]);
        assert_eq!(messages(log.visible(20)).len(), 6);
    }

    #[test]
    fn test_scrolled_view_stays_put() {
        let mut log = LogState::with_capacity(10);
        for i in 0..6 {
            log.push(LogLine::info(format!("line {i}")));
        }
        log.scroll_up(2);
        assert!(!log.is_following());
        assert_eq!(messages(log.visible(2)), ["line 2", "line 3"]);

        log.push(LogLine::info("line 6"));
        assert_eq!(messages(log.visible(2)), ["line 2", "line 3"]);

        log.scroll_to_bottom();
        assert_eq!(messages(log.visible(1)), ["line 6"]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut log = LogState::with_capacity(10);
        log.scroll_up(5);
        assert!(log.is_following());

        log.push(LogLine::info("a"));
        log.push(LogLine::info("b"));
        log.scroll_up(100);
        assert_eq!(messages(log.visible(1)), ["a"]);
        log.scroll_down(100);
        assert!(log.is_following());
    }
}
