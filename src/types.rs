//! Core domain types shared across the pipeline

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BotError, Result};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A social-media handle under monitoring
///
/// Handles are normalized to carry the leading `@` and compare
/// case-insensitively; the registry enforces uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredHandle {
    pub id: Uuid,
    /// Normalized handle string (always `@`-prefixed)
    pub handle: String,
    /// Most recent post text seen for this handle
    pub last_post: String,
    /// Tickers detected in the most recent post, first-seen order
    pub detected_tickers: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// A tracked ticker signal extracted from a monitored handle's post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedTicker {
    pub id: Uuid,
    /// Ticker symbol without the `$` sigil
    pub ticker: String,
    /// Handle the signal originated from
    pub source: String,
    /// Post text the signal was extracted from
    pub post: String,
    pub timestamp: DateTime<Utc>,
    /// Virality subscore, 0-100
    pub virality: u8,
    /// Trend subscore, 0-100
    pub trend: u8,
    /// Social mention count, monotonically non-decreasing
    pub mentions: u64,
    /// Composite confidence, 0-100, pure function of the three fields above
    pub confidence: u8,
    pub analyzed: bool,
}

impl DetectedTicker {
    pub fn new(ticker: &str, source: &str, post: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            source: source.to_string(),
            post: post.to_string(),
            timestamp,
            virality: 0,
            trend: 0,
            mentions: 0,
            confidence: 0,
            analyzed: false,
        }
    }
}

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseReason {
    TakeProfit,
    StopLoss,
    Manual,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::TakeProfit => write!(f, "take-profit"),
            CloseReason::StopLoss => write!(f, "stop-loss"),
            CloseReason::Manual => write!(f, "manual"),
        }
    }
}

/// An open or closed trading position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub ticker: String,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    /// Position size in quote currency (USDT)
    pub size: Decimal,
    /// Unrealized P&L in quote currency
    pub pnl: Decimal,
    /// Unrealized P&L as a percentage of entry
    pub pnl_percent: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub close_reason: Option<CloseReason>,
}

impl Position {
    pub fn new(ticker: &str, entry_price: Decimal, size: Decimal) -> Self {
        let mut pos = Self {
            id: Uuid::new_v4(),
            ticker: ticker.to_string(),
            entry_price,
            current_price: entry_price,
            size,
            pnl: Decimal::ZERO,
            pnl_percent: Decimal::ZERO,
            opened_at: Utc::now(),
            closed_at: None,
            close_reason: None,
        };
        pos.revalue(entry_price);
        pos
    }

    /// Recompute P&L at a new observed price.
    ///
    /// Maintains `pnl_percent == (current - entry) / entry * 100` and
    /// `pnl == size * pnl_percent / 100` exactly.
    pub fn revalue(&mut self, current_price: Decimal) {
        self.current_price = current_price;
        self.pnl_percent = (current_price - self.entry_price) / self.entry_price * dec!(100);
        self.pnl = self.size * self.pnl_percent / dec!(100);
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// Activity log entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Detection,
    Analysis,
    Trade,
    System,
}

/// A single activity log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// Monotonic sequence number; the authoritative ordering, not the timestamp
    pub seq: u64,
    pub kind: LogKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Mutable trading configuration
///
/// Changes apply only to future decisions, never retroactively to open
/// positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSettings {
    #[serde(default = "default_auto_trade")]
    pub auto_trade_enabled: bool,
    /// Position size in quote currency (USDT)
    #[serde(default = "default_position_size")]
    pub position_size: Decimal,
    #[serde(default = "default_take_profit")]
    pub take_profit_percent: Decimal,
    #[serde(default = "default_stop_loss")]
    pub stop_loss_percent: Decimal,
}

fn default_auto_trade() -> bool {
    true
}

fn default_position_size() -> Decimal {
    dec!(500)
}

fn default_take_profit() -> Decimal {
    dec!(25)
}

fn default_stop_loss() -> Decimal {
    dec!(10)
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            auto_trade_enabled: default_auto_trade(),
            position_size: default_position_size(),
            take_profit_percent: default_take_profit(),
            stop_loss_percent: default_stop_loss(),
        }
    }
}

impl TradingSettings {
    /// Reject non-positive sizes and thresholds at the API boundary.
    pub fn validate(&self) -> Result<()> {
        if self.position_size <= Decimal::ZERO {
            return Err(BotError::InvalidSize(self.position_size));
        }
        if self.take_profit_percent <= Decimal::ZERO {
            return Err(BotError::Config(format!(
                "take profit must be positive, got {}",
                self.take_profit_percent
            )));
        }
        if self.stop_loss_percent <= Decimal::ZERO {
            return Err(BotError::Config(format!(
                "stop loss must be positive, got {}",
                self.stop_loss_percent
            )));
        }
        Ok(())
    }
}
