//! Derived order book figures shown in the book panel and the status log

use rust_decimal::Decimal;

/// Levels per side used for the imbalance figure
pub const IMBALANCE_LEVELS: usize = 5;

/// Figures derived from the latest order book snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookMetrics {
    pub mid_price: Option<Decimal>,
    pub spread: Option<Decimal>,
    pub spread_bps: Option<Decimal>,

    /// (bid_vol - ask_vol) / (bid_vol + ask_vol) over the top [`IMBALANCE_LEVELS`]
    pub imbalance: Option<Decimal>,

    /// Summed quantity per side, `None` if the sum overflows
    pub bid_depth: Option<Decimal>,
    pub ask_depth: Option<Decimal>,

    pub bid_levels: usize,
    pub ask_levels: usize,
}

impl BookMetrics {
    /// Both sides present and a positive mid price
    pub fn is_healthy(&self) -> bool {
        self.mid_price.is_some()
            && self.spread_bps.is_some()
            && self.bid_levels > 0
            && self.ask_levels > 0
    }

    /// Bid depth over ask depth
    pub fn depth_ratio(&self) -> Option<Decimal> {
        let ask_depth = self.ask_depth.filter(|depth| *depth > Decimal::ZERO)?;
        self.bid_depth?.checked_div(ask_depth)
    }

    /// A crossed book has the best bid at or above the best ask
    pub fn is_crossed(&self) -> bool {
        self.spread.map_or(false, |spread| spread <= Decimal::ZERO)
    }
}
