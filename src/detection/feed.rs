//! Bounded feed of tracked ticker signals
//!
//! Newest-first collection owned by the pipeline. A ticker mention from a
//! given handle inside the observation window is the same tracked signal:
//! re-detection refreshes its source post and timestamp instead of creating
//! a duplicate record.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::types::DetectedTicker;

/// Result of feeding a detection into the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new signal was created
    New(Uuid),
    /// An existing signal inside the window was refreshed
    Refreshed(Uuid),
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            UpsertOutcome::New(id) | UpsertOutcome::Refreshed(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, UpsertOutcome::New(_))
    }
}

pub struct DetectionFeed {
    /// Newest-first
    entries: VecDeque<DetectedTicker>,
    capacity: usize,
    window: Duration,
}

impl DetectionFeed {
    pub fn new(capacity: usize, window_secs: i64) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            window: Duration::seconds(window_secs),
        }
    }

    /// Insert or refresh the tracked signal for (ticker, handle).
    ///
    /// A matching record inside the observation window keeps its scores and
    /// identity; only the source post and timestamp move forward.
    pub fn upsert(
        &mut self,
        ticker: &str,
        source: &str,
        post: &str,
        now: DateTime<Utc>,
    ) -> UpsertOutcome {
        let window = self.window;
        if let Some(existing) = self.entries.iter_mut().find(|t| {
            t.ticker == ticker && t.source == source && (!t.analyzed || now - t.timestamp <= window)
        }) {
            existing.post = post.to_string();
            existing.timestamp = now;
            return UpsertOutcome::Refreshed(existing.id);
        }

        let record = DetectedTicker::new(ticker, source, post, now);
        let id = record.id;
        self.entries.push_front(record);
        if self.capacity > 0 {
            self.entries.truncate(self.capacity);
        }
        UpsertOutcome::New(id)
    }

    pub fn get(&self, id: Uuid) -> Option<&DetectedTicker> {
        self.entries.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut DetectedTicker> {
        self.entries.iter_mut().find(|t| t.id == id)
    }

    /// Tracked signals, newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &DetectedTicker> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DetectedTicker> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
