//! Instrument identity and feed stream naming

use std::fmt;

use crate::error::{Result, TerminalError};

/// Candle intervals accepted by the kline stream
pub const KLINE_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
];

/// Level counts offered by the partial depth stream
pub const DEPTH_LEVEL_CHOICES: &[u16] = &[5, 10, 20];

/// Update speeds (ms) offered by the partial depth stream
pub const DEPTH_SPEED_CHOICES: &[u32] = &[100, 250, 500];

/// The one instrument the terminal watches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    symbol: String,
    interval: String,
}

impl Instrument {
    /// Create an instrument, validating the symbol and candle interval
    pub fn new(symbol: &str, interval: &str) -> Result<Self> {
        let symbol = symbol.trim().to_lowercase();
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TerminalError::ConfigError(format!(
                "invalid symbol: {:?}",
                symbol
            )));
        }

        let interval = interval.trim();
        if !KLINE_INTERVALS.contains(&interval) {
            return Err(TerminalError::ConfigError(format!(
                "unsupported kline interval: {}",
                interval
            )));
        }

        Ok(Self {
            symbol,
            interval: interval.to_string(),
        })
    }

    /// Lowercase symbol as used in stream names
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Uppercase symbol for display
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// Stream name for one feed of this instrument
    pub fn stream_name(&self, kind: FeedKind, depth: DepthParams) -> String {
        match kind {
            FeedKind::Trade => format!("{}@trade", self.symbol),
            FeedKind::Depth => format!(
                "{}@depth{}@{}ms",
                self.symbol, depth.levels, depth.update_ms
            ),
            FeedKind::Ticker => format!("{}@ticker", self.symbol),
            FeedKind::Kline => format!("{}@kline_{}", self.symbol, self.interval),
        }
    }

    /// Stream names for all four feeds, in [`FeedKind::ALL`] order
    pub fn stream_names(&self, depth: DepthParams) -> Vec<String> {
        FeedKind::ALL
            .iter()
            .map(|kind| self.stream_name(*kind, depth))
            .collect()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_symbol(), self.interval)
    }
}

/// Partial depth stream parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthParams {
    pub levels: u16,
    pub update_ms: u32,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            levels: 20,
            update_ms: 100,
        }
    }
}

/// Kind of upstream feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Trade,
    Depth,
    Ticker,
    Kline,
}

impl FeedKind {
    pub const ALL: [FeedKind; 4] = [
        FeedKind::Trade,
        FeedKind::Depth,
        FeedKind::Ticker,
        FeedKind::Kline,
    ];

    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Trade => "trade",
            FeedKind::Depth => "depth",
            FeedKind::Ticker => "ticker",
            FeedKind::Kline => "kline",
        }
    }

    /// Infer the feed kind from a stream name such as `btcusdt@kline_1m`
    pub fn from_stream_name(stream: &str) -> Result<Self> {
        let (_, channel) = stream
            .split_once('@')
            .ok_or_else(|| TerminalError::UnknownStream(stream.to_string()))?;

        if channel.starts_with("kline_") {
            Ok(FeedKind::Kline)
        } else if channel.starts_with("depth") {
            Ok(FeedKind::Depth)
        } else if channel == "ticker" {
            Ok(FeedKind::Ticker)
        } else if channel == "trade" || channel == "aggTrade" {
            Ok(FeedKind::Trade)
        } else {
            Err(TerminalError::UnknownStream(stream.to_string()))
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
