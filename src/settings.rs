//! Runtime-adjustable trading settings with validation and persistence.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::error::SettingsError;

/// The full settings snapshot a decision cycle reads at its start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub news_sentiment_enabled: bool,
    pub statistical_arbitrage_enabled: bool,
    pub volatility_based_enabled: bool,
    /// Kelly damping factor; 0.5 is half-Kelly.
    pub kelly_fraction: Decimal,
    /// Per-position notional cap as a bankroll fraction.
    pub max_position_size_pct: Decimal,
    pub stop_loss_pct: Decimal,
    /// Minimum |mean sentiment| before the news strategy trades.
    pub news_sentiment_threshold: f64,
    /// Spread z-score distance for arbitrage entries.
    pub stat_arbitrage_threshold: f64,
    /// Minimum regime confidence for volatility signals.
    pub volatility_threshold: f64,
    pub trade_interval_seconds: u64,
    pub market_data_update_interval_seconds: u64,
    pub volatility_window: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            news_sentiment_enabled: true,
            statistical_arbitrage_enabled: true,
            volatility_based_enabled: true,
            kelly_fraction: dec!(0.5),
            max_position_size_pct: dec!(0.10),
            stop_loss_pct: dec!(0.05),
            news_sentiment_threshold: 0.6,
            stat_arbitrage_threshold: 2.0,
            volatility_threshold: 0.6,
            trade_interval_seconds: 60,
            market_data_update_interval_seconds: 60,
            volatility_window: 20,
        }
    }
}

impl Settings {
    /// Range checks for every numeric field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &str) -> SettingsError {
            SettingsError::Invalid {
                field,
                reason: reason.to_string(),
            }
        }

        if self.kelly_fraction <= Decimal::ZERO || self.kelly_fraction > Decimal::ONE {
            return Err(invalid("kelly_fraction", "must be in (0, 1]"));
        }
        if self.max_position_size_pct <= Decimal::ZERO || self.max_position_size_pct > dec!(0.5) {
            return Err(invalid("max_position_size_pct", "must be in (0, 0.5]"));
        }
        if self.stop_loss_pct <= Decimal::ZERO || self.stop_loss_pct > dec!(0.5) {
            return Err(invalid("stop_loss_pct", "must be in (0, 0.5]"));
        }
        if !(0.0..=1.0).contains(&self.news_sentiment_threshold) {
            return Err(invalid("news_sentiment_threshold", "must be in [0, 1]"));
        }
        if self.stat_arbitrage_threshold <= 0.0 || self.stat_arbitrage_threshold > 10.0 {
            return Err(invalid("stat_arbitrage_threshold", "must be in (0, 10]"));
        }
        if !(0.0..=1.0).contains(&self.volatility_threshold) {
            return Err(invalid("volatility_threshold", "must be in [0, 1]"));
        }
        if self.trade_interval_seconds == 0 {
            return Err(invalid("trade_interval_seconds", "must be positive"));
        }
        if self.market_data_update_interval_seconds == 0 {
            return Err(invalid(
                "market_data_update_interval_seconds",
                "must be positive",
            ));
        }
        if self.volatility_window < 2 {
            return Err(invalid("volatility_window", "must be at least 2"));
        }
        Ok(())
    }
}

/// Partial update: only the fields present are changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub news_sentiment_enabled: Option<bool>,
    pub statistical_arbitrage_enabled: Option<bool>,
    pub volatility_based_enabled: Option<bool>,
    pub kelly_fraction: Option<Decimal>,
    pub max_position_size_pct: Option<Decimal>,
    pub stop_loss_pct: Option<Decimal>,
    pub news_sentiment_threshold: Option<f64>,
    pub stat_arbitrage_threshold: Option<f64>,
    pub volatility_threshold: Option<f64>,
    pub trade_interval_seconds: Option<u64>,
    pub market_data_update_interval_seconds: Option<u64>,
    pub volatility_window: Option<usize>,
}

/// Result of a successful update: the new snapshot plus what changed.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedUpdate {
    pub settings: Settings,
    pub changed: Vec<&'static str>,
}

/// Owns the current settings, validates updates, persists to a JSON file,
/// and publishes each accepted change on a watch channel.
pub struct SettingsManager {
    path: PathBuf,
    current: Mutex<Settings>,
    tx: watch::Sender<Settings>,
}

impl SettingsManager {
    /// Load settings from the file, falling back to defaults when absent.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let settings: Settings = serde_json::from_str(&raw)?;
            settings.validate()?;
            settings
        } else {
            Settings::default()
        };

        let (tx, _) = watch::channel(settings.clone());
        Ok(Self {
            path,
            current: Mutex::new(settings),
            tx,
        })
    }

    /// Current snapshot. Cycles call this once at cycle start.
    pub fn snapshot(&self) -> Settings {
        self.lock().clone()
    }

    /// Receiver that observes every accepted settings change.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Apply a partial update.
    ///
    /// The merged settings are validated before anything is stored; a
    /// rejected update leaves the current settings untouched. Accepted
    /// updates are persisted and broadcast.
    pub fn update(&self, update: SettingsUpdate) -> Result<AppliedUpdate, SettingsError> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let mut changed = Vec::new();

        macro_rules! merge {
            ($field:ident) => {
                if let Some(value) = update.$field {
                    if next.$field != value {
                        next.$field = value;
                        changed.push(stringify!($field));
                    }
                }
            };
        }
        merge!(news_sentiment_enabled);
        merge!(statistical_arbitrage_enabled);
        merge!(volatility_based_enabled);
        merge!(kelly_fraction);
        merge!(max_position_size_pct);
        merge!(stop_loss_pct);
        merge!(news_sentiment_threshold);
        merge!(stat_arbitrage_threshold);
        merge!(volatility_threshold);
        merge!(trade_interval_seconds);
        merge!(market_data_update_interval_seconds);
        merge!(volatility_window);

        next.validate()?;
        self.persist(&next)?;
        *guard = next.clone();
        drop(guard);

        let _ = self.tx.send(next.clone());
        if !changed.is_empty() {
            info!(?changed, "settings updated");
        }
        Ok(AppliedUpdate {
            settings: next,
            changed,
        })
    }

    fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Settings> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kalshi-quant-settings-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut settings = Settings::default();
        settings.kelly_fraction = dec!(1.5);
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "kelly_fraction", .. })
        ));

        let mut settings = Settings::default();
        settings.volatility_window = 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn update_merges_and_reports_changes() {
        let path = temp_path("merge");
        let manager = SettingsManager::load(&path).unwrap();

        let applied = manager
            .update(SettingsUpdate {
                stat_arbitrage_threshold: Some(2.5),
                news_sentiment_enabled: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(applied.changed, vec!["news_sentiment_enabled", "stat_arbitrage_threshold"]);
        assert_eq!(manager.snapshot().stat_arbitrage_threshold, 2.5);
        assert!(!manager.snapshot().news_sentiment_enabled);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejected_update_changes_nothing() {
        let path = temp_path("reject");
        let manager = SettingsManager::load(&path).unwrap();

        let err = manager
            .update(SettingsUpdate {
                stop_loss_pct: Some(dec!(0.9)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "stop_loss_pct", .. }));
        assert_eq!(manager.snapshot(), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn updates_are_broadcast() {
        let path = temp_path("watch");
        let manager = SettingsManager::load(&path).unwrap();
        let rx = manager.subscribe();

        manager
            .update(SettingsUpdate {
                volatility_threshold: Some(0.8),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(rx.borrow().volatility_threshold, 0.8);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn persisted_settings_reload() {
        let path = temp_path("reload");
        {
            let manager = SettingsManager::load(&path).unwrap();
            manager
                .update(SettingsUpdate {
                    trade_interval_seconds: Some(120),
                    ..Default::default()
                })
                .unwrap();
        }
        let reloaded = SettingsManager::load(&path).unwrap();
        assert_eq!(reloaded.snapshot().trade_interval_seconds, 120);
        let _ = std::fs::remove_file(&path);
    }
}
