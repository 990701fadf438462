//! Latest partial-depth order book snapshot
//!
//! The feed delivers the top levels of both sides on every update, so the book
//! is replaced wholesale instead of being patched level by level.

use rust_decimal::Decimal;

use super::metrics::IMBALANCE_LEVELS;
use super::BookMetrics;
use crate::parser::PriceLevel;

/// Top-N order book as last delivered by the depth feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    /// Bids in feed order (best first)
    bids: Vec<PriceLevel>,
    /// Asks in feed order (best first)
    asks: Vec<PriceLevel>,
    /// First bid price of the latest snapshot with a non-empty bid side
    best_bid: Option<Decimal>,
    /// First ask price of the latest snapshot with a non-empty ask side
    best_ask: Option<Decimal>,
    /// Event time of the last snapshot
    last_update_time: Option<i64>,
    /// Number of snapshots applied
    updates: u64,
}

impl OrderBook {
    /// Create an empty order book
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both sides with a new snapshot
    ///
    /// Best bid/ask follow the first level of each side and keep their previous
    /// value when that side is empty.
    pub fn replace(&mut self, bids: Vec<PriceLevel>, asks: Vec<PriceLevel>, event_time: Option<i64>) {
        if let Some(level) = bids.first() {
            self.best_bid = Some(level.price);
        }
        if let Some(level) = asks.first() {
            self.best_ask = Some(level.price);
        }

        self.bids = bids;
        self.asks = asks;
        self.last_update_time = event_time.or(self.last_update_time);
        self.updates += 1;
    }

    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.best_bid
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.best_ask
    }

    /// Get mid price; `None` if the sum overflows
    pub fn mid_price(&self) -> Option<Decimal> {
        let (bid, ask) = (self.best_bid?, self.best_ask?);
        bid.checked_add(ask)?.checked_div(Decimal::from(2))
    }

    /// Absolute spread between best ask and best bid
    pub fn spread(&self) -> Option<Decimal> {
        self.best_ask?.checked_sub(self.best_bid?)
    }

    /// Get spread in basis points
    pub fn spread_bps(&self) -> Option<Decimal> {
        let mid = self.mid_price().filter(|mid| *mid > Decimal::ZERO)?;
        self.spread()?
            .checked_div(mid)?
            .checked_mul(Decimal::from(10000))
    }

    /// Calculate order book imbalance at top N levels
    pub fn imbalance(&self, levels: usize) -> Option<Decimal> {
        let bid_volume = total_quantity(self.bids.iter().take(levels))?;
        let ask_volume = total_quantity(self.asks.iter().take(levels))?;

        let total = bid_volume.checked_add(ask_volume)?;
        if total > Decimal::ZERO {
            bid_volume.checked_sub(ask_volume)?.checked_div(total)
        } else {
            None
        }
    }

    pub fn last_update_time(&self) -> Option<i64> {
        self.last_update_time
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Calculate order book metrics
    pub fn metrics(&self) -> BookMetrics {
        BookMetrics {
            mid_price: self.mid_price(),
            spread: self.spread(),
            spread_bps: self.spread_bps(),
            imbalance: self.imbalance(IMBALANCE_LEVELS),
            bid_depth: total_quantity(&self.bids),
            ask_depth: total_quantity(&self.asks),
            bid_levels: self.bids.len(),
            ask_levels: self.asks.len(),
        }
    }
}

/// Summed quantity of the levels, `None` on overflow
fn total_quantity<'a>(levels: impl IntoIterator<Item = &'a PriceLevel>) -> Option<Decimal> {
    levels
        .into_iter()
        .try_fold(Decimal::ZERO, |total, level| total.checked_add(level.quantity))
}
