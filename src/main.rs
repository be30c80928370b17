// src/main.rs
use anyhow::{Context, Result};
use dotenvy::dotenv;
use reversal_bot::config::{AppConfig, StrategyKind};
use reversal_bot::connectors::alpaca::AlpacaClient;
use reversal_bot::core::engine::TradingEngine;
use reversal_bot::strategies::model::ModelStrategy;
use reversal_bot::strategies::reversal::DailyReversal;
use reversal_bot::strategies::traits::Strategy;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::from_env().context("failed to load configuration")?;

    // Guard must outlive main so buffered log lines get flushed.
    let _guard = init_logging()?;

    println!("========================================");
    println!("       REVERSAL BOT - v0.1.1");
    println!("========================================");
    println!("Target: {}", config.symbol);
    println!(
        "Mode:   {}",
        if config.is_paper() {
            "📝 PAPER TRADING"
        } else {
            "🚨 LIVE TRADING"
        }
    );
    println!("========================================");

    // 2. Initialize Components
    // One REST client serves both trading and market data.
    let client = Arc::new(AlpacaClient::from_config(&config));

    let strategy: Box<dyn Strategy> = match config.strategy {
        StrategyKind::Reversal => Box::new(DailyReversal),
        StrategyKind::Model => {
            Box::new(ModelStrategy::load(Path::new(&config.model_path))?)
        }
    };

    // 3. Run Engine
    let engine = TradingEngine::new(config, client.clone(), client, strategy);

    tokio::select! {
        result = engine.run() => {
            if let Err(e) = result {
                eprintln!("Fatal Engine Error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping.");
        }
    }

    Ok(())
}

fn init_logging() -> Result<WorkerGuard> {
    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "reversal-bot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn,rustls=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file_writer.and(std::io::stdout))
        .with_ansi(false)
        .compact()
        .init();

    Ok(guard)
}
