//! Market state module
//!
//! Bounded in-memory views of the four feeds for one instrument.

mod book;
mod buffer;
mod metrics;
mod state;
mod tape;

pub use book::OrderBook;
pub use buffer::BoundedBuffer;
pub use metrics::{BookMetrics, IMBALANCE_LEVELS};
pub use state::{Capacities, MarketSnapshot, MarketState};
pub use tape::{format_trade_time, TradeRecord, TradeSide, TRADE_DECIMALS};

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}
