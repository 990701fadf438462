//! Configuration module for the market terminal

use std::env;
use std::str::FromStr;

use crate::error::TerminalError;
use crate::instrument::{DepthParams, Instrument, DEPTH_LEVEL_CHOICES, DEPTH_SPEED_CHOICES};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Trading symbol to watch (e.g., "btcusdt")
    pub symbol: String,

    /// Candle interval for the kline stream (e.g., "1m")
    pub kline_interval: String,

    /// WebSocket base endpoint; stream names are appended as path segments
    pub ws_endpoint: String,

    /// Partial depth stream settings
    pub depth_levels: u16,
    pub depth_update_ms: u32,

    /// Fixed delay before every reconnect attempt
    pub reconnect_delay_ms: u64,

    /// Render period of the dashboard
    pub render_interval_ms: u64,

    /// Bounded buffer capacities
    pub price_history: usize,
    pub trade_history: usize,

    /// Order book levels shown per side
    pub book_display_levels: usize,

    /// Status log interval in seconds
    pub status_log_interval_secs: u64,

    /// Log destination (stdout belongs to the UI)
    pub log_file: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            symbol: env::var("SYMBOL")
                .unwrap_or(defaults.symbol)
                .trim()
                .to_lowercase(),
            kline_interval: env::var("KLINE_INTERVAL").unwrap_or(defaults.kline_interval),
            ws_endpoint: env::var("WS_ENDPOINT").unwrap_or(defaults.ws_endpoint),
            depth_levels: env_parse("DEPTH_LEVELS", defaults.depth_levels)?,
            depth_update_ms: env_parse("DEPTH_UPDATE_MS", defaults.depth_update_ms)?,
            reconnect_delay_ms: env_parse("RECONNECT_DELAY_MS", defaults.reconnect_delay_ms)?,
            render_interval_ms: env_parse("RENDER_INTERVAL_MS", defaults.render_interval_ms)?,
            price_history: env_parse("PRICE_HISTORY", defaults.price_history)?,
            trade_history: env_parse("TRADE_HISTORY", defaults.trade_history)?,
            book_display_levels: env_parse("BOOK_DISPLAY_LEVELS", defaults.book_display_levels)?,
            status_log_interval_secs: env_parse(
                "STATUS_LOG_INTERVAL_SECS",
                defaults.status_log_interval_secs,
            )?,
            log_file: env::var("LOG_FILE").unwrap_or(defaults.log_file),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that would otherwise break the feeds or the views
    pub fn validate(&self) -> Result<(), TerminalError> {
        self.instrument()?;

        if !DEPTH_LEVEL_CHOICES.contains(&self.depth_levels) {
            return Err(TerminalError::ConfigError(format!(
                "DEPTH_LEVELS must be one of {:?}, got {}",
                DEPTH_LEVEL_CHOICES, self.depth_levels
            )));
        }
        if !DEPTH_SPEED_CHOICES.contains(&self.depth_update_ms) {
            return Err(TerminalError::ConfigError(format!(
                "DEPTH_UPDATE_MS must be one of {:?}, got {}",
                DEPTH_SPEED_CHOICES, self.depth_update_ms
            )));
        }

        let positive = [
            ("RECONNECT_DELAY_MS", self.reconnect_delay_ms),
            ("RENDER_INTERVAL_MS", self.render_interval_ms),
            ("PRICE_HISTORY", self.price_history as u64),
            ("TRADE_HISTORY", self.trade_history as u64),
            ("BOOK_DISPLAY_LEVELS", self.book_display_levels as u64),
            ("STATUS_LOG_INTERVAL_SECS", self.status_log_interval_secs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(TerminalError::ConfigError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        if self.ws_endpoint.trim().is_empty() {
            return Err(TerminalError::ConfigError(
                "WS_ENDPOINT must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The instrument described by this configuration
    pub fn instrument(&self) -> Result<Instrument, TerminalError> {
        Instrument::new(&self.symbol, &self.kline_interval)
    }

    pub fn depth_params(&self) -> DepthParams {
        DepthParams {
            levels: self.depth_levels,
            update_ms: self.depth_update_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "btcusdt".to_string(),
            kline_interval: "1m".to_string(),
            ws_endpoint: "wss://fstream.binance.com/ws".to_string(),
            depth_levels: 20,
            depth_update_ms: 100,
            reconnect_delay_ms: 2000,
            render_interval_ms: 500,
            price_history: 200,
            trade_history: 120,
            book_display_levels: 8,
            status_log_interval_secs: 30,
            log_file: "market-terminal.log".to_string(),
        }
    }
}

/// Parse an optional environment variable, falling back to `default` when unset
fn env_parse<T>(key: &str, default: T) -> Result<T, TerminalError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| TerminalError::ConfigError(format!("{}={:?}: {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}
