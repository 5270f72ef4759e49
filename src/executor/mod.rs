//! Order execution seam
//!
//! [`OrderExecutor`] is the trade placement contract. The simulated
//! implementation fills at the quoted market price; production would route
//! to a real exchange client.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{BotError, Result};
use crate::market::MarketDataSource;
use crate::types::Side;

/// A filled order
#[derive(Debug, Clone, Copy)]
pub struct Fill {
    pub fill_price: Decimal,
}

/// Trade placement contract
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Place an order and return the fill price.
    ///
    /// On `OrderExecutionFailed` no position is created or closed; the
    /// caller records the failure as a `trade` log entry instead of a fill.
    async fn place_order(&self, ticker: &str, side: Side, size: Decimal) -> Result<Fill>;
}

/// Executor that fills instantly at the current simulated market price
pub struct SimulatedExecutor {
    market: Arc<dyn MarketDataSource>,
}

impl SimulatedExecutor {
    pub fn new(market: Arc<dyn MarketDataSource>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl OrderExecutor for SimulatedExecutor {
    async fn place_order(&self, ticker: &str, side: Side, size: Decimal) -> Result<Fill> {
        if size <= Decimal::ZERO {
            return Err(BotError::InvalidSize(size));
        }

        let fill_price = self
            .market
            .current_price(ticker)
            .await
            .map_err(|e| BotError::OrderExecutionFailed(e.to_string()))?;

        tracing::debug!("{} ${} filled @ {} ({} USDT)", side, ticker, fill_price, size);
        Ok(Fill { fill_price })
    }
}
