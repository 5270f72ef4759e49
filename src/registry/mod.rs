//! Monitored handle registry
//!
//! Exclusive owner of [`MonitoredHandle`] records. Handles are normalized to
//! a leading `@` and deduplicated case-insensitively.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::activity::ActivityLog;
use crate::error::{BotError, Result};
use crate::types::{LogKind, MonitoredHandle};

/// Placeholder post shown until the first real post is ingested
const SCANNING_PLACEHOLDER: &str = "Scanning for posts...";

pub struct HandleRegistry {
    handles: Vec<MonitoredHandle>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Add a handle to the monitoring list.
    ///
    /// Normalizes the input (leading `@`, surrounding whitespace stripped).
    /// Returns `Ok(None)` on empty input (logged, not an error) and
    /// `DuplicateHandle` if an equal handle already exists, compared
    /// case-insensitively.
    pub fn add(&mut self, raw: &str, log: &mut ActivityLog) -> Result<Option<Uuid>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "@" {
            log.append(LogKind::System, "Ignored empty handle input");
            return Ok(None);
        }

        let handle = normalize(trimmed);
        if self
            .handles
            .iter()
            .any(|h| h.handle.eq_ignore_ascii_case(&handle))
        {
            return Err(BotError::DuplicateHandle(handle));
        }

        let record = MonitoredHandle {
            id: Uuid::new_v4(),
            handle: handle.clone(),
            last_post: SCANNING_PLACEHOLDER.to_string(),
            detected_tickers: Vec::new(),
            updated_at: Utc::now(),
        };
        let id = record.id;
        self.handles.push(record);

        tracing::info!("Monitoring new handle {}", handle);
        log.append(
            LogKind::System,
            format!("Added {} to monitoring list", handle),
        );
        Ok(Some(id))
    }

    /// Remove a handle by id.
    ///
    /// `NotFound` if absent; the failed removal produces no log entry.
    pub fn remove(&mut self, id: Uuid, log: &mut ActivityLog) -> Result<MonitoredHandle> {
        let idx = self
            .handles
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| BotError::NotFound(format!("handle {}", id)))?;

        let removed = self.handles.remove(idx);
        tracing::info!("Stopped monitoring {}", removed.handle);
        log.append(
            LogKind::System,
            format!("Removed {} from monitoring", removed.handle),
        );
        Ok(removed)
    }

    /// Replace the handle's last-seen post. Detection is the caller's job.
    pub fn ingest_post(&mut self, id: Uuid, text: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let handle = self
            .handles
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| BotError::NotFound(format!("handle {}", id)))?;
        handle.last_post = text.to_string();
        handle.updated_at = timestamp;
        Ok(())
    }

    /// Record the tickers detected in the handle's latest post.
    pub fn set_detected_tickers(&mut self, id: Uuid, tickers: Vec<String>) -> Result<()> {
        let handle = self
            .handles
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| BotError::NotFound(format!("handle {}", id)))?;
        handle.detected_tickers = tickers;
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&MonitoredHandle> {
        self.handles.iter().find(|h| h.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitoredHandle> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(raw: &str) -> String {
    if raw.starts_with('@') {
        raw.to_string()
    } else {
        format!("@{}", raw)
    }
}
