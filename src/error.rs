//! Error types for the signal pipeline

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, BotError>;

/// Pipeline error taxonomy
///
/// Every variant is recoverable at its point of origin: the offending
/// operation is rejected and recorded, the pipeline keeps running.
#[derive(Error, Debug, Clone)]
pub enum BotError {
    #[error("handle {0} is already monitored")]
    DuplicateHandle(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid position size: {0}")]
    InvalidSize(Decimal),

    #[error("re-analysis already in progress for ${0}")]
    AnalysisInProgress(String),

    #[error("price unavailable for ${0}")]
    PriceUnavailable(String),

    #[error("feed unavailable for {0}")]
    FeedUnavailable(String),

    #[error("order execution failed: {0}")]
    OrderExecutionFailed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Whether this error is a transient per-entity failure during a tick.
    ///
    /// These degrade a single handle or position for one tick; the rest of
    /// the tick proceeds.
    pub fn is_tick_degradation(&self) -> bool {
        matches!(
            self,
            BotError::PriceUnavailable(_) | BotError::FeedUnavailable(_)
        )
    }

    /// Whether the error rejects a user/system action against current state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BotError::DuplicateHandle(_)
                | BotError::NotFound(_)
                | BotError::InvalidSize(_)
                | BotError::AnalysisInProgress(_)
        )
    }
}
