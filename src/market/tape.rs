//! Trade tape records

use chrono::{Local, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Decimal places shown for trade price and quantity
pub const TRADE_DECIMALS: u32 = 4;

const UNKNOWN_TIME: &str = "--:--:--";

/// Aggressor side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// A buyer-maker print means the seller crossed the spread
    pub fn from_maker_flag(is_buyer_maker: bool) -> Self {
        if is_buyer_maker {
            TradeSide::Sell
        } else {
            TradeSide::Buy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// One formatted entry of the trade tape
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    /// Local wall-clock time of the trade, `HH:MM:SS`
    pub time: String,
    pub side: TradeSide,
    /// Quantity rounded to [`TRADE_DECIMALS`]
    pub quantity: Decimal,
    /// Price rounded to [`TRADE_DECIMALS`]
    pub price: Decimal,
}

impl TradeRecord {
    pub fn new(trade_time_ms: Option<i64>, is_buyer_maker: bool, quantity: Decimal, price: Decimal) -> Self {
        Self {
            time: format_trade_time(trade_time_ms),
            side: TradeSide::from_maker_flag(is_buyer_maker),
            quantity: round_trade_value(quantity),
            price: round_trade_value(price),
        }
    }
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:.4} @ {:.4}",
            self.time,
            self.side.label(),
            self.quantity,
            self.price
        )
    }
}

/// Render an epoch-millisecond timestamp as local `HH:MM:SS`
pub fn format_trade_time(trade_time_ms: Option<i64>) -> String {
    trade_time_ms
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

fn round_trade_value(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(TRADE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}
