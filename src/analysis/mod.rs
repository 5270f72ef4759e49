//! Signal analysis
//!
//! Scores detected tickers (virality, trend, mentions) and derives the
//! composite confidence. Manual re-analysis is staged asynchronously with a
//! per-ticker lock: while a rescan is pending the ticker is `scanning`, and
//! a second request is rejected with `AnalysisInProgress`. The lock is
//! per-ticker; everything else stays fully operable.

mod scorer;

pub use scorer::{SignalScores, SimulatedScorer, TickerScorer};

use std::collections::HashSet;

use uuid::Uuid;

use crate::activity::ActivityLog;
use crate::error::{BotError, Result};
use crate::types::{DetectedTicker, LogKind};

/// Mentions saturate the confidence contribution at this count.
const MENTION_SATURATION: u64 = 15_000;

/// Composite confidence in [0,100].
///
/// Pure function of (virality, trend, mentions): weighted 40/40/20 with the
/// mention term saturating at [`MENTION_SATURATION`], rounded half-up.
pub fn confidence(virality: u8, trend: u8, mentions: u64) -> u8 {
    let mention_score = (mentions / (MENTION_SATURATION / 100)).min(100) as u32;
    let weighted_x10 = 4 * virality as u32 + 4 * trend as u32 + 2 * mention_score;
    (((weighted_x10 + 5) / 10) as u8).min(100)
}

pub struct AnalysisEngine {
    scorer: Box<dyn TickerScorer>,
    /// Tickers with a pending re-analysis
    pending: HashSet<Uuid>,
}

impl AnalysisEngine {
    pub fn new(scorer: Box<dyn TickerScorer>) -> Self {
        Self {
            scorer,
            pending: HashSet::new(),
        }
    }

    /// Score a freshly detected ticker and mark it analyzed.
    pub fn analyze(&mut self, signal: &mut DetectedTicker, log: &mut ActivityLog) {
        let scores = self.scorer.score(&signal.ticker);
        apply_scores(signal, scores);
        signal.analyzed = true;

        tracing::debug!(
            "Analyzed ${}: virality={} trend={} mentions={} confidence={}",
            signal.ticker,
            signal.virality,
            signal.trend,
            signal.mentions,
            signal.confidence
        );
        log.append(
            LogKind::Analysis,
            format!(
                "Analysis complete: ${} confidence {}%",
                signal.ticker, signal.confidence
            ),
        );
    }

    /// Request a manual re-analysis.
    ///
    /// Puts the ticker into the transient scanning state. Rejected with
    /// `AnalysisInProgress` while a previous request is still pending.
    pub fn request_rescan(&mut self, signal: &DetectedTicker) -> Result<()> {
        if self.pending.contains(&signal.id) {
            return Err(BotError::AnalysisInProgress(signal.ticker.clone()));
        }
        self.pending.insert(signal.id);
        tracing::debug!("Re-analysis pending for ${}", signal.ticker);
        Ok(())
    }

    /// Complete a pending re-analysis: re-score, clear the lock, log.
    pub fn complete_rescan(&mut self, signal: &mut DetectedTicker, log: &mut ActivityLog) {
        self.pending.remove(&signal.id);

        let scores = self.scorer.score(&signal.ticker);
        apply_scores(signal, scores);
        signal.analyzed = true;

        log.append(
            LogKind::Analysis,
            format!(
                "Re-analysis complete: ${} confidence {}%",
                signal.ticker, signal.confidence
            ),
        );
    }

    /// Drop the lock for a signal that disappeared before completion.
    pub fn clear_pending(&mut self, id: Uuid) {
        self.pending.remove(&id);
    }

    pub fn is_scanning(&self, id: Uuid) -> bool {
        self.pending.contains(&id)
    }

    /// Advance the signal's mention count and keep confidence consistent.
    ///
    /// Mentions only grow; confidence is recomputed so it stays a pure
    /// function of the current subscores at every observation.
    pub fn grow_mentions(&mut self, signal: &mut DetectedTicker) {
        signal.mentions += self.scorer.mention_delta();
        signal.confidence = confidence(signal.virality, signal.trend, signal.mentions);
    }
}

fn apply_scores(signal: &mut DetectedTicker, scores: SignalScores) {
    signal.virality = scores.virality.min(100);
    signal.trend = scores.trend.min(100);
    // Mentions never move backwards over the observation window
    signal.mentions = signal.mentions.max(scores.mentions);
    signal.confidence = confidence(signal.virality, signal.trend, signal.mentions);
}
