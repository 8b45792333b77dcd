//! Sliding windows
//!
//! A window holds timestamped entries (a request hit has amount 1, a cost
//! entry holds dollars). An entry counts while `timestamp > now - window`.
//! Every read and write prunes expired entries first, so memory stays
//! bounded by the traffic of one window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One timestamped entry in a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub timestamp_ms: i64,
    pub amount: f64,
}

impl WindowEntry {
    pub fn hit(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            amount: 1.0,
        }
    }

    pub fn cost(timestamp_ms: i64, amount: f64) -> Self {
        Self {
            timestamp_ms,
            amount,
        }
    }
}

/// Time-bounded list of entries, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow {
    window_ms: i64,
    entries: VecDeque<WindowEntry>,
}

impl SlidingWindow {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            entries: VecDeque::new(),
        }
    }

    /// Build from entries in any order; expired ones are dropped.
    pub fn from_entries(window_ms: i64, entries: Vec<WindowEntry>, now_ms: i64) -> Self {
        let mut sorted = entries;
        sorted.sort_by_key(|e| e.timestamp_ms);
        let mut window = Self {
            window_ms,
            entries: sorted.into(),
        };
        window.prune(now_ms);
        window
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    fn cutoff(&self, now_ms: i64) -> i64 {
        now_ms - self.window_ms
    }

    /// Drop every entry at or before `now - window`.
    pub fn prune(&mut self, now_ms: i64) {
        let cutoff = self.cutoff(now_ms);
        while self
            .entries
            .front()
            .is_some_and(|e| e.timestamp_ms <= cutoff)
        {
            self.entries.pop_front();
        }
    }

    pub fn push(&mut self, entry: WindowEntry, now_ms: i64) {
        self.prune(now_ms);
        let position = self
            .entries
            .iter()
            .rposition(|e| e.timestamp_ms <= entry.timestamp_ms)
            .map_or(0, |p| p + 1);
        self.entries.insert(position, entry);
    }

    /// Number of live entries.
    pub fn count(&mut self, now_ms: i64) -> usize {
        self.prune(now_ms);
        self.entries.len()
    }

    /// Sum of live entry amounts.
    pub fn total(&mut self, now_ms: i64) -> f64 {
        self.prune(now_ms);
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Live entries, oldest first.
    pub fn entries(&mut self, now_ms: i64) -> Vec<WindowEntry> {
        self.prune(now_ms);
        self.entries.iter().copied().collect()
    }

    /// Whole seconds until the oldest live entry expires (at least 1).
    ///
    /// Falls back to the full window when the window is empty.
    pub fn seconds_until_oldest_expires(&mut self, now_ms: i64) -> u64 {
        self.prune(now_ms);
        match self.entries.front() {
            Some(oldest) => ceil_seconds(oldest.timestamp_ms + self.window_ms - now_ms),
            None => ceil_seconds(self.window_ms),
        }
    }

    /// Whole seconds until at least `amount` of the live total has expired.
    ///
    /// Returns `None` if the live entries do not add up to `amount`.
    pub fn seconds_until_released(&mut self, now_ms: i64, amount: f64) -> Option<u64> {
        self.prune(now_ms);
        if amount <= 0.0 {
            return Some(0);
        }
        let mut released = 0.0;
        for entry in &self.entries {
            released += entry.amount;
            if released >= amount {
                return Some(ceil_seconds(entry.timestamp_ms + self.window_ms - now_ms));
            }
        }
        None
    }
}

fn ceil_seconds(ms: i64) -> u64 {
    let ms = ms.max(1) as u64;
    ms.div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60_000;

    #[test]
    fn test_entries_expire_exactly_at_window_edge() {
        let mut window = SlidingWindow::new(MINUTE);
        window.push(WindowEntry::hit(0), 0);
        assert_eq!(window.count(MINUTE - 1), 1);
        assert_eq!(window.count(MINUTE), 0);
    }

    #[test]
    fn test_push_prunes_expired_entries() {
        let mut window = SlidingWindow::new(MINUTE);
        window.push(WindowEntry::hit(0), 0);
        window.push(WindowEntry::hit(10), 10);
        window.push(WindowEntry::hit(MINUTE + 5), MINUTE + 5);
        assert_eq!(window.entries(MINUTE + 5).len(), 2);
    }

    #[test]
    fn test_total_sums_amounts() {
        let mut window = SlidingWindow::new(3_600_000);
        window.push(WindowEntry::cost(0, 1.25), 0);
        window.push(WindowEntry::cost(1_000, 2.5), 1_000);
        assert!((window.total(2_000) - 3.75).abs() < 1e-9);
    }

    #[test]
    fn test_seconds_until_oldest_expires() {
        let mut window = SlidingWindow::new(MINUTE);
        window.push(WindowEntry::hit(1_000), 1_000);
        assert_eq!(window.seconds_until_oldest_expires(31_000), 30);
        assert_eq!(window.seconds_until_oldest_expires(60_999), 1);
    }

    #[test]
    fn test_empty_window_retry_is_full_window() {
        let mut window = SlidingWindow::new(MINUTE);
        assert_eq!(window.seconds_until_oldest_expires(0), 60);
    }

    #[test]
    fn test_seconds_until_released() {
        let mut window = SlidingWindow::new(3_600_000);
        window.push(WindowEntry::cost(0, 1.0), 0);
        window.push(WindowEntry::cost(600_000, 2.0), 600_000);
        // Need 1.5 released → second entry must expire at 4_200_000.
        assert_eq!(window.seconds_until_released(1_200_000, 1.5), Some(3000));
        assert_eq!(window.seconds_until_released(1_200_000, 10.0), None);
    }

    #[test]
    fn test_from_entries_sorts_and_prunes() {
        let window = SlidingWindow::from_entries(
            MINUTE,
            vec![WindowEntry::hit(70_000), WindowEntry::hit(5_000), WindowEntry::hit(65_000)],
            100_000,
        );
        let mut window = window;
        let entries = window.entries(100_000);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].timestamp_ms < entries[1].timestamp_ms);
    }
}
