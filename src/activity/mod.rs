//! Append-only activity log
//!
//! Single entry point for every writer in the pipeline. Total order across
//! components equals call order: each entry gets a monotonic sequence number
//! at append time, so two events from the same tick still read back in
//! causal order regardless of timestamp granularity.

use std::collections::VecDeque;

use chrono::Utc;
use uuid::Uuid;

use crate::types::{LogEntry, LogKind};

/// Bounded, append-only record of every state transition
pub struct ActivityLog {
    /// Oldest-first storage; reads reverse it
    entries: VecDeque<LogEntry>,
    next_seq: u64,
    /// 0 means unbounded retention
    max_entries: usize,
}

impl ActivityLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_seq: 0,
            max_entries,
        }
    }

    /// Append an entry; the only write path into the log.
    pub fn append(&mut self, kind: LogKind, message: impl Into<String>) -> &LogEntry {
        if self.max_entries > 0 && self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        let entry = LogEntry {
            id: Uuid::new_v4(),
            seq: self.next_seq,
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        };
        self.next_seq += 1;
        self.entries.push_back(entry);
        self.entries.back().expect("just pushed")
    }

    /// Entries newest-first, without mutating storage order.
    pub fn recent(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total entries ever appended, including any evicted by retention.
    pub fn appended(&self) -> u64 {
        self.next_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_monotonic_seq() {
        let mut log = ActivityLog::new(0);
        log.append(LogKind::System, "first");
        log.append(LogKind::Detection, "second");
        log.append(LogKind::Trade, "third");

        let seqs: Vec<u64> = log.recent().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![2, 1, 0]);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut log = ActivityLog::new(0);
        log.append(LogKind::System, "a");
        log.append(LogKind::System, "b");

        let messages: Vec<&str> = log.recent().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "a"]);
    }

    #[test]
    fn test_bounded_retention_evicts_oldest() {
        let mut log = ActivityLog::new(3);
        for i in 0..5 {
            log.append(LogKind::System, format!("entry {}", i));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.appended(), 5);
        let messages: Vec<&str> = log.recent().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 4", "entry 3", "entry 2"]);
    }

    #[test]
    fn test_unbounded_when_zero() {
        let mut log = ActivityLog::new(0);
        for i in 0..100 {
            log.append(LogKind::System, format!("{}", i));
        }
        assert_eq!(log.len(), 100);
    }
}
