//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Process-level configuration, distinct from the runtime-adjustable
/// [`crate::settings::Settings`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Exchange ===
    /// Kalshi trade API base URL.
    #[serde(default = "default_kalshi_url")]
    pub kalshi_base_url: String,

    /// Optional Kalshi API key for authenticated endpoints.
    #[serde(default)]
    pub kalshi_api_key: Option<String>,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Trading ===
    /// Starting bankroll in dollars.
    #[serde(default = "default_bankroll")]
    pub initial_bankroll: Decimal,

    /// Simulation mode (no real orders).
    #[serde(default = "default_true")]
    pub dry_run: bool,

    // === Persistence ===
    /// Path to the runtime settings JSON file.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    // === Server ===
    /// HTTP server port for health/status endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_kalshi_url() -> String {
    "https://api.elections.kalshi.com".to_string()
}

fn default_http_timeout_ms() -> u64 {
    5_000
}

fn default_bankroll() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_true() -> bool {
    true
}

fn default_settings_path() -> String {
    "settings.json".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check that the configuration is internally consistent.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_bankroll <= Decimal::ZERO {
            return Err("INITIAL_BANKROLL must be positive".to_string());
        }
        if self.kalshi_base_url.is_empty() {
            return Err("KALSHI_BASE_URL must not be empty".to_string());
        }
        if !self.dry_run && self.kalshi_api_key.is_none() {
            return Err("KALSHI_API_KEY is required when DRY_RUN=false".to_string());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kalshi_base_url: default_kalshi_url(),
            kalshi_api_key: None,
            http_timeout_ms: default_http_timeout_ms(),
            initial_bankroll: default_bankroll(),
            dry_run: default_true(),
            settings_path: default_settings_path(),
            port: default_port(),
            rust_log: default_log_level(),
        }
    }
}
