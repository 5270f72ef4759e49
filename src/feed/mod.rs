//! Social feed seam
//!
//! [`SocialFeedSource`] is the contract a real feed reader would implement;
//! the simulated source generates posts over a meme-ticker pool at a
//! configurable rate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;

/// A post fetched from a handle's feed
#[derive(Debug, Clone)]
pub struct Post {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Feed reader contract
#[async_trait]
pub trait SocialFeedSource: Send + Sync {
    fn name(&self) -> &str;

    /// Latest post for `handle`, or `None` when nothing new was published.
    ///
    /// Fails with `FeedUnavailable`; the handle's last post stays unchanged
    /// and no detection happens for it this tick.
    async fn fetch_latest_post(&self, handle: &str) -> Result<Option<Post>>;
}

const TICKER_POOL: &[&str] = &[
    "PEPE", "BONK", "WIF", "SOL", "DOGE", "SHIB", "FLOKI", "MOG", "POPCAT", "TURBO",
];

const POST_TEMPLATES: &[&str] = &[
    "Just loaded up on ${T}, this one is going parabolic",
    "The ${T} chart is printing a god candle right now",
    "${T} entry looking clean here. NFA but I'm in.",
    "Whales are rotating into ${T}, volume doubling every hour",
    "${T} about to break out of the range, watch closely",
    "Sold my bags for ${T}. See you on the other side.",
];

/// Seedable post generator standing in for a real social feed
pub struct SimulatedFeed {
    rng: Mutex<StdRng>,
    /// Probability (percent) that a polled handle has a new post
    post_chance: u8,
}

impl SimulatedFeed {
    pub fn new(seed: u64, post_chance: u8) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            post_chance: post_chance.min(100),
        }
    }

    pub fn from_entropy(post_chance: u8) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            post_chance: post_chance.min(100),
        }
    }
}

#[async_trait]
impl SocialFeedSource for SimulatedFeed {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch_latest_post(&self, _handle: &str) -> Result<Option<Post>> {
        let mut rng = self.rng.lock();
        if rng.random_range(0..100) >= self.post_chance as u32 {
            return Ok(None);
        }

        let ticker = TICKER_POOL[rng.random_range(0..TICKER_POOL.len())];
        let template = POST_TEMPLATES[rng.random_range(0..POST_TEMPLATES.len())];
        let text = template.replace("{T}", ticker);

        Ok(Some(Post {
            text,
            timestamp: Utc::now(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_posts_carry_detectable_tickers() {
        let feed = SimulatedFeed::new(11, 100);
        for _ in 0..50 {
            let post = feed
                .fetch_latest_post("@CryptoWhale")
                .await
                .unwrap()
                .expect("post_chance 100 always posts");
            assert!(post.text.contains('$'));
        }
    }

    #[tokio::test]
    async fn test_zero_chance_never_posts() {
        let feed = SimulatedFeed::new(11, 0);
        for _ in 0..20 {
            assert!(feed.fetch_latest_post("@x").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_posts() {
        let a = SimulatedFeed::new(4, 100);
        let b = SimulatedFeed::new(4, 100);
        for _ in 0..20 {
            let pa = a.fetch_latest_post("@x").await.unwrap().unwrap();
            let pb = b.fetch_latest_post("@x").await.unwrap().unwrap();
            assert_eq!(pa.text, pb.text);
        }
    }
}
