//! Pluggable scoring function
//!
//! In production this seam is backed by an external analytics collaborator;
//! here it is a seedable random source so sessions and tests are
//! reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Raw subscores for one ticker observation
#[derive(Debug, Clone, Copy)]
pub struct SignalScores {
    /// 0-100
    pub virality: u8,
    /// 0-100
    pub trend: u8,
    pub mentions: u64,
}

/// Scoring seam between detection and trade decision
pub trait TickerScorer: Send {
    /// Produce subscores for a ticker observation.
    fn score(&mut self, ticker: &str) -> SignalScores;

    /// How many new social mentions landed since the last tick.
    fn mention_delta(&mut self) -> u64;
}

/// Seedable random scorer standing in for the analytics collaborator
pub struct SimulatedScorer {
    rng: StdRng,
}

impl SimulatedScorer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl TickerScorer for SimulatedScorer {
    fn score(&mut self, _ticker: &str) -> SignalScores {
        SignalScores {
            virality: self.rng.random_range(55..=95),
            trend: self.rng.random_range(55..=95),
            mentions: self.rng.random_range(1_000..=15_000),
        }
    }

    fn mention_delta(&mut self) -> u64 {
        self.rng.random_range(0..10)
    }
}
