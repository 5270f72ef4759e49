//! Signal pipeline
//!
//! Owns every state store and wires the components into the
//! detection → analysis → decision → position flow. All mutation goes
//! through the operations here, driven by the scheduler one tick or one
//! command at a time, so every transition sees a consistent snapshot of
//! settings and no store is ever aliased mutably.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::activity::ActivityLog;
use crate::analysis::{AnalysisEngine, TickerScorer};
use crate::config::Config;
use crate::detection::{DetectionFeed, TickerDetector};
use crate::error::{BotError, Result};
use crate::executor::OrderExecutor;
use crate::feed::{Post, SocialFeedSource};
use crate::market::MarketDataSource;
use crate::positions::PositionBook;
use crate::registry::HandleRegistry;
use crate::trade::{OpenDecision, SignalState, TradeDecisionEngine};
use crate::types::{CloseReason, DetectedTicker, LogKind, Side, TradingSettings};

/// Aggregate pipeline state, the header numbers of a monitoring UI
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub handles: usize,
    pub tracked_signals: usize,
    pub open_positions: usize,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub log_entries: usize,
}

pub struct SignalPipeline {
    registry: HandleRegistry,
    detector: TickerDetector,
    detections: DetectionFeed,
    analysis: AnalysisEngine,
    decisions: TradeDecisionEngine,
    book: PositionBook,
    log: ActivityLog,
    settings: TradingSettings,
    feed: Box<dyn SocialFeedSource>,
    market: Arc<dyn MarketDataSource>,
    executor: Box<dyn OrderExecutor>,
}

impl SignalPipeline {
    pub fn new(
        config: &Config,
        scorer: Box<dyn TickerScorer>,
        feed: Box<dyn SocialFeedSource>,
        market: Arc<dyn MarketDataSource>,
        executor: Box<dyn OrderExecutor>,
    ) -> Self {
        Self {
            registry: HandleRegistry::new(),
            detector: TickerDetector::new(),
            detections: DetectionFeed::new(
                config.detection.feed_capacity,
                config.detection.window_secs,
            ),
            analysis: AnalysisEngine::new(scorer),
            decisions: TradeDecisionEngine::new(),
            book: PositionBook::new(),
            log: ActivityLog::new(config.activity.max_entries),
            settings: config.trading.clone(),
            feed,
            market,
            executor,
        }
    }

    /// Register the configured seed handles and announce readiness.
    pub fn bootstrap(&mut self, handles: &[String]) {
        for handle in handles {
            if let Err(e) = self.add_handle(handle) {
                tracing::warn!("Seed handle {} rejected: {}", handle, e);
            }
        }
        self.log.append(
            LogKind::System,
            format!("Bot initialized. Monitoring {} handles.", self.registry.len()),
        );
    }

    /// One clock tick: poll feeds, advance mention counts, revalue positions.
    ///
    /// Runs to completion before the next tick or command is admitted; a
    /// failing handle or ticker degrades only itself, never the whole tick.
    pub async fn tick(&mut self) {
        self.poll_handles().await;
        self.grow_mentions();
        self.revalue_positions().await;
    }

    async fn poll_handles(&mut self) {
        let handles: Vec<(Uuid, String)> = self
            .registry
            .iter()
            .map(|h| (h.id, h.handle.clone()))
            .collect();

        for (id, handle) in handles {
            let fetched = self.feed.fetch_latest_post(&handle).await;
            match fetched {
                Ok(Some(post)) => self.process_post(id, &handle, &post).await,
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("Feed failure for {}: {}", handle, e);
                    self.log.append(
                        LogKind::System,
                        format!("Feed unavailable for {}; skipped this tick", handle),
                    );
                }
            }
        }
    }

    async fn process_post(&mut self, handle_id: Uuid, handle: &str, post: &Post) {
        if self
            .registry
            .ingest_post(handle_id, &post.text, post.timestamp)
            .is_err()
        {
            // Handle removed between poll and ingest; drop the post
            return;
        }

        let tickers = self.detector.detect(&post.text);
        let _ = self.registry.set_detected_tickers(handle_id, tickers.clone());

        for symbol in tickers {
            let outcome = self
                .detections
                .upsert(&symbol, handle, &post.text, post.timestamp);
            if !outcome.is_new() {
                continue;
            }

            let signal_id = outcome.id();
            self.decisions.on_detected(signal_id);
            tracing::info!("Detected ${} in post from {}", symbol, handle);
            self.log.append(
                LogKind::Detection,
                format!("Ticker ${} detected from {}", symbol, handle),
            );

            let snapshot = {
                let signal = self
                    .detections
                    .get_mut(signal_id)
                    .expect("signal just inserted");
                self.analysis.analyze(signal, &mut self.log);
                signal.clone()
            };

            match self.decisions.decide(&snapshot, &self.settings) {
                OpenDecision::Open { size } => self.open_position(&snapshot, size).await,
                OpenDecision::Skip => {}
            }
        }
    }

    async fn open_position(&mut self, signal: &DetectedTicker, size: Decimal) {
        let placed = self
            .executor
            .place_order(&signal.ticker, Side::Buy, size)
            .await;
        match placed {
            Ok(fill) => match self.book.open(&signal.ticker, fill.fill_price, size) {
                Ok(pos) => {
                    tracing::info!(
                        "Opened ${} position: {} USDT @ {}",
                        pos.ticker,
                        pos.size,
                        pos.entry_price
                    );
                    self.decisions.mark_traded(signal.id);
                    self.log.append(
                        LogKind::Trade,
                        format!(
                            "BUY executed: ${} @ ${} ({} USDT)",
                            signal.ticker, fill.fill_price, size
                        ),
                    );
                }
                Err(e) => {
                    self.decisions.mark_skipped(signal.id);
                    self.log.append(
                        LogKind::Trade,
                        format!("BUY failed: ${} ({})", signal.ticker, e),
                    );
                }
            },
            Err(e) => {
                tracing::warn!("Order for ${} failed: {}", signal.ticker, e);
                self.decisions.mark_skipped(signal.id);
                self.log.append(
                    LogKind::Trade,
                    format!("BUY failed: ${} ({})", signal.ticker, e),
                );
            }
        }
    }

    fn grow_mentions(&mut self) {
        for signal in self.detections.iter_mut() {
            if signal.analyzed {
                self.analysis.grow_mentions(signal);
            }
        }
    }

    async fn revalue_positions(&mut self) {
        for ticker in self.book.open_tickers() {
            let price = match self.market.current_price(&ticker).await {
                Ok(p) => p,
                Err(e) => {
                    // Position keeps its last known price and sits out this
                    // tick's TP/SL evaluation
                    tracing::debug!("Price failure for ${}: {}", ticker, e);
                    self.log.append(
                        LogKind::System,
                        format!("Price unavailable for ${}; checks skipped this tick", ticker),
                    );
                    continue;
                }
            };

            for id in self.book.apply_price_tick(&ticker, price) {
                let reason = self
                    .book
                    .get(id)
                    .and_then(|pos| self.decisions.check_close(pos, &self.settings));
                if let Some(reason) = reason {
                    self.close_position(id, reason).await;
                }
            }
        }
    }

    async fn close_position(&mut self, id: Uuid, reason: CloseReason) {
        let Some(pos) = self.book.get(id).cloned() else {
            return;
        };

        let placed = self
            .executor
            .place_order(&pos.ticker, Side::Sell, pos.size)
            .await;
        match placed {
            Ok(_fill) => {
                if let Ok(closed) = self.book.close(id, reason) {
                    tracing::info!(
                        "Closed ${} position ({}): P&L {} USDT",
                        closed.ticker,
                        reason,
                        closed.pnl
                    );
                    let sign = if closed.pnl >= Decimal::ZERO { "+" } else { "" };
                    self.log.append(
                        LogKind::Trade,
                        format!(
                            "SELL executed: ${} @ ${} ({}, P&L {}{} USDT)",
                            closed.ticker, closed.current_price, reason, sign, closed.pnl
                        ),
                    );
                }
            }
            Err(e) => {
                tracing::warn!("Close order for ${} failed: {}", pos.ticker, e);
                self.log.append(
                    LogKind::Trade,
                    format!("SELL failed: ${} ({})", pos.ticker, e),
                );
            }
        }
    }

    // --- Discrete operations, admitted between ticks ---

    /// Add a handle to monitoring. Duplicates are rejected and recorded.
    pub fn add_handle(&mut self, raw: &str) -> Result<Option<Uuid>> {
        match self.registry.add(raw, &mut self.log) {
            Ok(id) => Ok(id),
            Err(e) => {
                if let BotError::DuplicateHandle(handle) = &e {
                    self.log.append(
                        LogKind::System,
                        format!("Handle {} is already monitored", handle),
                    );
                }
                Err(e)
            }
        }
    }

    /// Remove a handle. Signals already emitted for it stay tracked; only
    /// future detection stops.
    pub fn remove_handle(&mut self, id: Uuid) -> Result<()> {
        self.registry.remove(id, &mut self.log)?;
        Ok(())
    }

    /// Stage a manual re-analysis for a tracked signal.
    ///
    /// The signal enters the scanning state until
    /// [`complete_reanalysis`](Self::complete_reanalysis) runs; overlapping
    /// requests are rejected with `AnalysisInProgress`.
    pub fn request_reanalysis(&mut self, signal_id: Uuid) -> Result<String> {
        let signal = self
            .detections
            .get(signal_id)
            .ok_or_else(|| BotError::NotFound(format!("signal {}", signal_id)))?
            .clone();
        self.analysis.request_rescan(&signal)?;
        Ok(signal.ticker)
    }

    /// Finish a pending re-analysis. Always clears the per-ticker lock,
    /// even if the signal fell out of the feed while the scan ran.
    pub fn complete_reanalysis(&mut self, signal_id: Uuid) {
        match self.detections.get_mut(signal_id) {
            Some(signal) => self.analysis.complete_rescan(signal, &mut self.log),
            None => self.analysis.clear_pending(signal_id),
        }
    }

    /// Replace the trading settings. Applies to future decisions only.
    pub fn update_settings(&mut self, settings: TradingSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.log.append(LogKind::System, "Trading settings updated");
        Ok(())
    }

    pub fn set_auto_trade(&mut self, enabled: bool) {
        if self.settings.auto_trade_enabled != enabled {
            self.settings.auto_trade_enabled = enabled;
            let state = if enabled { "enabled" } else { "disabled" };
            self.log
                .append(LogKind::System, format!("Auto-trade {}", state));
        }
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            handles: self.registry.len(),
            tracked_signals: self.detections.len(),
            open_positions: self.book.open_positions().len(),
            unrealized_pnl: self.book.total_unrealized_pnl(),
            realized_pnl: self.book.total_realized_pnl(),
            log_entries: self.log.len(),
        }
    }

    // --- Read access: point-in-time views, no aliasing of internals ---

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    pub fn detections(&self) -> &DetectionFeed {
        &self.detections
    }

    pub fn book(&self) -> &PositionBook {
        &self.book
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn settings(&self) -> &TradingSettings {
        &self.settings
    }

    pub fn is_scanning(&self, signal_id: Uuid) -> bool {
        self.analysis.is_scanning(signal_id)
    }

    pub fn decision_state(&self, signal_id: Uuid) -> Option<SignalState> {
        self.decisions.state(signal_id)
    }
}
