//! Market data seam
//!
//! The pipeline only ever sees [`MarketDataSource`]; in this repo the
//! implementation is a seedable random walk, in production it would be a
//! real exchange feed.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::error::Result;

/// Quote source for current market prices
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Current price for `ticker`, always positive.
    ///
    /// Fails with `PriceUnavailable`; the caller keeps the last known price
    /// and skips that position's TP/SL evaluation for the tick.
    async fn current_price(&self, ticker: &str) -> Result<Decimal>;
}

struct WalkState {
    rng: StdRng,
    prices: HashMap<String, Decimal>,
}

/// Seedable random-walk market
///
/// Prices initialize in the micro-cap range and move in basis-point steps
/// with a slight upward bias on every poll; the poll cadence is the tick
/// cadence, so one `current_price` call per ticker per tick advances the
/// walk one step.
pub struct SimulatedMarket {
    state: Mutex<WalkState>,
}

impl SimulatedMarket {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(WalkState {
                rng: StdRng::seed_from_u64(seed),
                prices: HashMap::new(),
            }),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            state: Mutex::new(WalkState {
                rng: StdRng::from_os_rng(),
                prices: HashMap::new(),
            }),
        }
    }

    /// Pin a ticker to a price; subsequent polls walk from there.
    pub fn set_price(&self, ticker: &str, price: Decimal) {
        self.state.lock().prices.insert(ticker.to_string(), price);
    }
}

#[async_trait]
impl MarketDataSource for SimulatedMarket {
    async fn current_price(&self, ticker: &str) -> Result<Decimal> {
        let mut state = self.state.lock();

        let current = match state.prices.get(ticker).copied() {
            Some(p) => p,
            None => {
                // Fresh listing somewhere in the 0.00001000-0.00005000 band
                let units = state.rng.random_range(1_000..=5_000);
                let price = Decimal::new(units, 8);
                state.prices.insert(ticker.to_string(), price);
                return Ok(price);
            }
        };

        // -1.92% to +2.08% per step, biased slightly upward
        let bps: i64 = state.rng.random_range(-192..=208);
        let mut next = current + current * Decimal::new(bps, 4);
        if next <= Decimal::ZERO {
            next = current;
        }
        state.prices.insert(ticker.to_string(), next);
        Ok(next)
    }
}
