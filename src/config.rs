//! Configuration
//!
//! Layered over an optional `config.toml` plus `CRYPTOBOT_`-prefixed
//! environment variables; every section carries serde defaults so a missing
//! file still yields a working configuration.

use serde::Deserialize;

use crate::error::{BotError, Result};
use crate::types::TradingSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trading: TradingSettings,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Handles monitored from startup
    #[serde(default = "default_handles")]
    pub handles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Max tracked signals kept in the feed (0 = unbounded)
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
    /// Observation window: a re-detected ticker inside this window is the
    /// same tracked signal
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig {
    /// Log retention (0 = unbounded)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Simulated latency of a manual re-analysis
    #[serde(default = "default_scan_duration_ms")]
    pub scan_duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Seed for every simulated collaborator; omit for entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Chance (percent) that a polled handle published a new post
    #[serde(default = "default_post_chance")]
    pub post_chance: u8,
}

fn default_handles() -> Vec<String> {
    vec![
        "@CryptoWhale".to_string(),
        "@DegenTrader".to_string(),
        "@AlphaLeaks".to_string(),
    ]
}

fn default_feed_capacity() -> usize {
    50
}

fn default_window_secs() -> i64 {
    600
}

fn default_max_entries() -> usize {
    1000
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_scan_duration_ms() -> u64 {
    2000
}

fn default_post_chance() -> u8 {
    30
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            feed_capacity: default_feed_capacity(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            scan_duration_ms: default_scan_duration_ms(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            post_chance: default_post_chance(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trading: TradingSettings::default(),
            detection: DetectionConfig::default(),
            activity: ActivityConfig::default(),
            scheduler: SchedulerConfig::default(),
            simulation: SimulationConfig::default(),
            handles: default_handles(),
        }
    }
}

impl Config {
    /// Load from file (optional) and environment, then validate.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CRYPTOBOT").separator("__"))
            .build()
            .map_err(|e| BotError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| BotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.trading.validate()?;
        if self.scheduler.tick_interval_ms == 0 {
            return Err(BotError::Config("tick interval must be positive".into()));
        }
        if self.detection.window_secs <= 0 {
            return Err(BotError::Config(
                "detection window must be positive".into(),
            ));
        }
        if self.simulation.post_chance > 100 {
            return Err(BotError::Config(format!(
                "post chance must be 0-100, got {}",
                self.simulation.post_chance
            )));
        }
        Ok(())
    }
}
