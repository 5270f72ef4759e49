//! CryptoSignal Bot
//!
//! Autonomous social-signal trading terminal.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use cryptosignal_bot::{
    analysis::{confidence, SimulatedScorer, TickerScorer},
    config::Config,
    detection::TickerDetector,
    executor::SimulatedExecutor,
    feed::SimulatedFeed,
    market::{MarketDataSource, SimulatedMarket},
    pipeline::SignalPipeline,
    scheduler::Scheduler,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cryptosignal-bot")]
#[command(about = "Social-signal driven crypto trading bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline against the simulated feed and market
    Run {
        /// Stop after this many ticks (runs until Ctrl-C otherwise)
        #[arg(long)]
        ticks: Option<u64>,
        /// Seed for the simulated collaborators (reproducible session)
        #[arg(long)]
        seed: Option<u64>,
        /// Override the tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Detect and score tickers in a single post text
    Scan {
        /// Post text to scan
        text: String,
        /// Scorer seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run {
            ticks,
            seed,
            interval_ms,
        } => run_bot(config, ticks, seed, interval_ms).await,
        Commands::Scan { text, seed } => scan_text(&text, seed),
    }
}

async fn run_bot(
    mut config: Config,
    ticks: Option<u64>,
    seed: Option<u64>,
    interval_ms: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(interval) = interval_ms {
        config.scheduler.tick_interval_ms = interval;
    }

    let seed = seed.or(config.simulation.seed);
    let post_chance = config.simulation.post_chance;

    let (scorer, market, feed): (Box<dyn TickerScorer>, Arc<dyn MarketDataSource>, _) = match seed {
        Some(s) => {
            tracing::info!("Deterministic session with seed {}", s);
            (
                Box::new(SimulatedScorer::new(s)),
                Arc::new(SimulatedMarket::new(s.wrapping_add(1))),
                Box::new(SimulatedFeed::new(s.wrapping_add(2), post_chance)),
            )
        }
        None => (
            Box::new(SimulatedScorer::from_entropy()),
            Arc::new(SimulatedMarket::from_entropy()),
            Box::new(SimulatedFeed::from_entropy(post_chance)),
        ),
    };
    let executor = Box::new(SimulatedExecutor::new(market.clone()));

    let mut pipeline = SignalPipeline::new(&config, scorer, feed, market, executor);
    pipeline.bootstrap(&config.handles);

    tracing::info!(
        "Starting pipeline: {} handles, tick every {}ms, auto-trade {}",
        pipeline.registry().len(),
        config.scheduler.tick_interval_ms,
        if pipeline.settings().auto_trade_enabled {
            "on"
        } else {
            "off"
        }
    );

    let scheduler = Scheduler::new(pipeline, &config.scheduler);
    let pipeline = scheduler.run(ticks).await;

    let summary = pipeline.summary();
    tracing::info!(
        "Session summary: {} handles, {} signals, {} open positions, unrealized P&L {} USDT, realized P&L {} USDT",
        summary.handles,
        summary.tracked_signals,
        summary.open_positions,
        summary.unrealized_pnl.round_dp(2),
        summary.realized_pnl.round_dp(2),
    );

    println!("--- activity log (most recent first) ---");
    for entry in pipeline.log().recent().take(25) {
        println!(
            "[{}] {:>9?}  {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.kind,
            entry.message
        );
    }

    Ok(())
}

fn scan_text(text: &str, seed: Option<u64>) -> anyhow::Result<()> {
    let detector = TickerDetector::new();
    let tickers = detector.detect(text);

    if tickers.is_empty() {
        println!("No tickers detected.");
        return Ok(());
    }

    let mut scorer: Box<dyn TickerScorer> = match seed {
        Some(s) => Box::new(SimulatedScorer::new(s)),
        None => Box::new(SimulatedScorer::from_entropy()),
    };

    for ticker in tickers {
        let scores = scorer.score(&ticker);
        let conf = confidence(scores.virality, scores.trend, scores.mentions);
        println!(
            "${}: virality {}%, trend {}%, {} mentions -> confidence {}%",
            ticker, scores.virality, scores.trend, scores.mentions, conf
        );
    }
    Ok(())
}
