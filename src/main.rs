//! Kalshi event-market trading bot entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kalshi_quant::api::{create_router, AppState};
use kalshi_quant::config::Config;
use kalshi_quant::market::KalshiClient;
use kalshi_quant::metrics;
use kalshi_quant::notifier::LogNotifier;
use kalshi_quant::risk::PortfolioState;
use kalshi_quant::settings::SettingsManager;
use kalshi_quant::trader::{
    DecisionArbiter, NewsSentimentStrategy, StatArbitrageStrategy, StaticArticleSource,
    TradingEngine, VolatilityStrategy,
};

/// Kalshi event-market trading bot.
#[derive(Parser, Debug)]
#[command(name = "kalshi-quant")]
#[command(about = "Multi-strategy statistical trading bot for Kalshi event markets")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the trading loop (default).
    Run {
        /// Run in dry-run mode (no real orders).
        #[arg(long)]
        dry_run: Option<bool>,

        /// HTTP server port for health/status.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the current runtime settings.
    ShowSettings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("kalshi_quant=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = PrometheusBuilder::new().install() {
        warn!(error = %e, "prometheus exporter not started");
    }
    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::ShowSettings) => cmd_show_settings(),
        Some(Command::Run { dry_run, port }) => cmd_run(dry_run, port).await,
        None => cmd_run(None, None).await,
    }
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate().map_err(anyhow::Error::msg)?;
    println!("configuration OK");
    println!("  kalshi_base_url: {}", config.kalshi_base_url);
    println!("  dry_run: {}", config.dry_run);
    println!("  initial_bankroll: {}", config.initial_bankroll);
    println!("  settings_path: {}", config.settings_path);
    Ok(())
}

/// Print the current runtime settings as JSON.
fn cmd_show_settings() -> anyhow::Result<()> {
    let config = Config::load()?;
    let manager = SettingsManager::load(&config.settings_path)?;
    println!("{}", serde_json::to_string_pretty(&manager.snapshot())?);
    Ok(())
}

/// Run the trading loop with the HTTP status server.
async fn cmd_run(dry_run: Option<bool>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(dry_run) = dry_run {
        config.dry_run = dry_run;
    }
    if let Some(port) = port {
        config.port = port;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    let settings = Arc::new(SettingsManager::load(&config.settings_path)?);
    let portfolio = Arc::new(PortfolioState::new(config.initial_bankroll));

    let arbiter = DecisionArbiter::new(vec![
        Box::new(NewsSentimentStrategy::new(StaticArticleSource::default())),
        Box::new(StatArbitrageStrategy),
        Box::new(VolatilityStrategy::default()),
    ]);
    let client = Arc::new(KalshiClient::new(&config));
    let engine = Arc::new(TradingEngine::new(
        config.clone(),
        settings.clone(),
        portfolio.clone(),
        arbiter,
        client,
        Arc::new(LogNotifier),
    ));

    // HTTP status server.
    let state = AppState::new(portfolio, settings);
    let router = create_router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "status server listening");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "status server failed");
        }
    });

    state.set_ready(true);
    let stop = engine.stop_handle();
    let runner = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run().await })
    };

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = stop.send(true);
    let _ = runner.await;
    server.abort();
    Ok(())
}
