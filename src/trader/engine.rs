//! The top-level trading engine: decision cycles plus background refresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::market::{spawn_refresh_task, MarketBook, MarketDataSource};
use crate::notifier::Notifier;
use crate::risk::{PortfolioState, PositionSide};
use crate::settings::{Settings, SettingsManager};

use super::arbiter::{DecisionArbiter, TradeDecision, TradeSide};
use super::strategy::StrategyContext;

/// Owns the decision loop and the market-data refresh task.
pub struct TradingEngine<S, N> {
    config: Config,
    settings: Arc<SettingsManager>,
    portfolio: Arc<PortfolioState>,
    book: Arc<MarketBook>,
    arbiter: DecisionArbiter,
    source: Arc<S>,
    notifier: Arc<N>,
    stop_tx: watch::Sender<bool>,
}

impl<S, N> TradingEngine<S, N>
where
    S: MarketDataSource + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        config: Config,
        settings: Arc<SettingsManager>,
        portfolio: Arc<PortfolioState>,
        arbiter: DecisionArbiter,
        source: Arc<S>,
        notifier: Arc<N>,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            config,
            settings,
            portfolio,
            book: Arc::new(MarketBook::default()),
            arbiter,
            source,
            notifier,
            stop_tx,
        }
    }

    /// Handle that flips the cooperative stop flag.
    pub fn stop_handle(&self) -> watch::Sender<bool> {
        self.stop_tx.clone()
    }

    pub fn book(&self) -> Arc<MarketBook> {
        self.book.clone()
    }

    /// Run until the stop flag flips.
    ///
    /// One decision cycle completes before the next starts; the market-data
    /// refresh runs on its own cadence and only shares the portfolio lock.
    pub async fn run(&self) {
        let settings = self.settings.snapshot();
        let refresh = spawn_refresh_task(
            self.source.clone(),
            self.book.clone(),
            self.portfolio.clone(),
            self.notifier.clone(),
            Duration::from_secs(settings.market_data_update_interval_seconds),
            self.stop_tx.subscribe(),
        );
        info!(
            dry_run = self.config.dry_run,
            bankroll = %self.portfolio.bankroll(),
            "trading engine started"
        );

        let mut stop_rx = self.stop_tx.subscribe();
        loop {
            // Interval re-read each pass so settings changes take effect on
            // the next cycle boundary.
            let interval = Duration::from_secs(self.settings.snapshot().trade_interval_seconds);
            tokio::select! {
                _ = tokio::time::sleep(interval) => self.run_cycle(),
                _ = stop_rx.changed() => {
                    if *stop_rx.borrow() {
                        info!("trading engine stopping");
                        break;
                    }
                }
            }
        }
        let _ = refresh.await;
    }

    /// One decision cycle: snapshot settings, arbitrate, execute.
    pub fn run_cycle(&self) {
        let start = Instant::now();
        let settings = self.settings.snapshot();
        let markets = self.book.snapshot();
        let ctx = StrategyContext {
            markets: &markets,
            settings: &settings,
        };

        match self.arbiter.decide(&ctx, self.portfolio.bankroll()) {
            Some(decision) => self.execute(decision, &settings),
            None => debug!("cycle produced no decision"),
        }
        crate::metrics::record_cycle_duration(start);
    }

    fn execute(&self, decision: TradeDecision, settings: &Settings) {
        let side = match decision.side {
            TradeSide::Buy => PositionSide::Long,
            TradeSide::Sell => PositionSide::Short,
        };
        let max_value = self.portfolio.bankroll() * settings.max_position_size_pct;

        match self.portfolio.open_position(
            &decision.market_id,
            side,
            decision.price,
            decision.quantity,
            settings.stop_loss_pct,
            max_value,
            &decision.strategy,
        ) {
            Ok(_) => {
                crate::metrics::inc_trades_executed(&decision.strategy);
                self.notifier.trade_executed(&decision);
                if self.config.dry_run {
                    debug!(trade_id = %decision.trade_id, "dry run, no order sent");
                }
            }
            Err(e) => {
                warn!(trade_id = %decision.trade_id, error = %e, "trade declined");
                self.notifier.alert(&format!("trade declined: {e}"));
            }
        }
    }

    /// Current bankroll, for status reporting.
    pub fn bankroll(&self) -> Decimal {
        self.portfolio.bankroll()
    }
}
