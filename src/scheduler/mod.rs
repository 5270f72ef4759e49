//! Scheduler
//!
//! Drives the pipeline: a periodic tick interval and an mpsc command
//! channel multiplexed through one `select!` loop, so every tick and every
//! discrete action runs to completion before the next is admitted.
//! Re-analysis latency is a spawned sleep whose completion comes back
//! through the same channel; the pending signal stays locked until then and
//! is never cancelled.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::config::SchedulerConfig;
use crate::error::{BotError, Result};
use crate::pipeline::SignalPipeline;
use crate::types::TradingSettings;

/// Discrete actions accepted while the pipeline runs
#[derive(Debug, Clone)]
pub enum BotCommand {
    AddHandle(String),
    RemoveHandle(Uuid),
    /// Manual re-analysis of a tracked signal
    Reanalyze(Uuid),
    SetAutoTrade(bool),
    UpdateSettings(TradingSettings),
    Shutdown,
}

enum Event {
    Command(BotCommand),
    RescanComplete(Uuid),
}

enum Flow {
    Continue,
    Stop,
}

/// Cloneable sender for issuing commands to a running scheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Event>,
}

impl SchedulerHandle {
    pub async fn send(&self, command: BotCommand) -> Result<()> {
        self.tx
            .send(Event::Command(command))
            .await
            .map_err(|_| BotError::Internal("scheduler stopped".into()))
    }
}

pub struct Scheduler {
    pipeline: SignalPipeline,
    tick_interval: Duration,
    scan_duration: Duration,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl Scheduler {
    pub fn new(pipeline: SignalPipeline, config: &SchedulerConfig) -> Self {
        let (tx, rx) = mpsc::channel(100);
        Self {
            pipeline,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            scan_duration: Duration::from_millis(config.scan_duration_ms),
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run until shutdown (or for `max_ticks` ticks), returning the
    /// pipeline for inspection.
    pub async fn run(mut self, max_ticks: Option<u64>) -> SignalPipeline {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.pipeline.tick().await;
                    ticks += 1;
                    if let Some(max) = max_ticks {
                        if ticks >= max {
                            tracing::info!("Completed {} ticks, stopping", ticks);
                            break;
                        }
                    }
                }
                Some(event) = self.rx.recv() => {
                    if matches!(self.handle_event(event), Flow::Stop) {
                        break;
                    }
                }
            }
        }

        self.pipeline
    }

    fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Command(BotCommand::AddHandle(handle)) => {
                if let Err(e) = self.pipeline.add_handle(&handle) {
                    tracing::warn!("Add handle rejected: {}", e);
                }
            }
            Event::Command(BotCommand::RemoveHandle(id)) => {
                if let Err(e) = self.pipeline.remove_handle(id) {
                    tracing::warn!("Remove handle rejected: {}", e);
                }
            }
            Event::Command(BotCommand::Reanalyze(id)) => match self.pipeline.request_reanalysis(id)
            {
                Ok(ticker) => {
                    tracing::info!("Re-analysis started for ${}", ticker);
                    let tx = self.tx.clone();
                    let delay = self.scan_duration;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Event::RescanComplete(id)).await;
                    });
                }
                Err(e) => tracing::warn!("Re-analysis rejected: {}", e),
            },
            Event::Command(BotCommand::SetAutoTrade(enabled)) => {
                self.pipeline.set_auto_trade(enabled);
            }
            Event::Command(BotCommand::UpdateSettings(settings)) => {
                if let Err(e) = self.pipeline.update_settings(settings) {
                    tracing::warn!("Settings rejected: {}", e);
                }
            }
            Event::Command(BotCommand::Shutdown) => {
                tracing::info!("Shutdown requested");
                return Flow::Stop;
            }
            Event::RescanComplete(id) => {
                self.pipeline.complete_reanalysis(id);
            }
        }
        Flow::Continue
    }
}
