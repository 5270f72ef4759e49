//! Position book
//!
//! Exclusive owner of [`Position`] records. The decision engine requests
//! opens and closes; nothing outside this module mutates a position.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{BotError, Result};
use crate::types::{CloseReason, Position};

pub struct PositionBook {
    open: Vec<Position>,
    closed: Vec<Position>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self {
            open: Vec::new(),
            closed: Vec::new(),
        }
    }

    /// Open a position. `InvalidSize` for size <= 0.
    pub fn open(&mut self, ticker: &str, entry_price: Decimal, size: Decimal) -> Result<&Position> {
        if size <= Decimal::ZERO {
            return Err(BotError::InvalidSize(size));
        }
        debug_assert!(entry_price > Decimal::ZERO, "entry price must be positive");

        self.open.push(Position::new(ticker, entry_price, size));
        Ok(self.open.last().expect("just pushed"))
    }

    /// Recompute P&L for every open position on `ticker` at `price`.
    ///
    /// Returns the ids of the repriced positions so the caller can run its
    /// close checks against fresh numbers.
    pub fn apply_price_tick(&mut self, ticker: &str, price: Decimal) -> Vec<Uuid> {
        let mut touched = Vec::new();
        for pos in self.open.iter_mut().filter(|p| p.ticker == ticker) {
            pos.revalue(price);
            touched.push(pos.id);
        }
        touched
    }

    /// Close a position.
    ///
    /// `NotFound` if the id was never seen; an already-closed position is an
    /// idempotent no-op returning the closed record.
    pub fn close(&mut self, id: Uuid, reason: CloseReason) -> Result<Position> {
        if let Some(idx) = self.open.iter().position(|p| p.id == id) {
            let mut pos = self.open.remove(idx);
            pos.closed_at = Some(chrono::Utc::now());
            pos.close_reason = Some(reason);
            self.closed.push(pos.clone());
            return Ok(pos);
        }
        if let Some(pos) = self.closed.iter().find(|p| p.id == id) {
            return Ok(pos.clone());
        }
        Err(BotError::NotFound(format!("position {}", id)))
    }

    pub fn get(&self, id: Uuid) -> Option<&Position> {
        self.open
            .iter()
            .chain(self.closed.iter())
            .find(|p| p.id == id)
    }

    pub fn open_positions(&self) -> &[Position] {
        &self.open
    }

    pub fn closed_positions(&self) -> &[Position] {
        &self.closed
    }

    /// Sum of unrealized P&L across open positions.
    pub fn total_unrealized_pnl(&self) -> Decimal {
        self.open.iter().map(|p| p.pnl).sum()
    }

    /// Sum of realized P&L across closed positions.
    pub fn total_realized_pnl(&self) -> Decimal {
        self.closed.iter().map(|p| p.pnl).sum()
    }

    /// Distinct tickers with at least one open position.
    pub fn open_tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = Vec::new();
        for pos in &self.open {
            if !tickers.contains(&pos.ticker) {
                tickers.push(pos.ticker.clone());
            }
        }
        tickers
    }
}

impl Default for PositionBook {
    fn default() -> Self {
        Self::new()
    }
}
