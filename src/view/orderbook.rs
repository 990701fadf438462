//! Order book ladder with proportional quantity bars

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{display_or_dash, ContentLine, PanelContent, Tone};
use crate::market::{BookMetrics, OrderBook, Side};
use crate::parser::PriceLevel;

/// Width of the price column
pub const PRICE_WIDTH: usize = 10;
/// Width of the quantity column
pub const QTY_WIDTH: usize = 12;
/// Bar length of the largest level on a side
pub const BAR_SCALE: u32 = 10;

const BID_MARKER: char = '█';
const ASK_MARKER: char = '▒';

/// Build the order book panel from the latest snapshot
pub fn build(book: &OrderBook, depth: usize) -> PanelContent {
    let asks = display_levels(book.asks(), depth);
    let bids = display_levels(book.bids(), depth);

    let mut content = PanelContent::new();
    content.push(ContentLine::toned(
        format!("Best Ask: {}", display_or_dash(book.best_ask())),
        Tone::Ask,
    ));
    content.blank();

    if book.update_count() == 0 {
        content.push(ContentLine::toned("waiting for depth updates...", Tone::Muted));
    } else {
        content.extend(render_bars(&asks, max_quantity(&asks), Side::Ask));
        content.blank();
        content.push(spread_line(&book.metrics()));
        content.blank();
        content.extend(render_bars(&bids, max_quantity(&bids), Side::Bid));
    }

    content.blank();
    content.push(ContentLine::toned(
        format!("Best Bid: {}", display_or_dash(book.best_bid())),
        Tone::Bid,
    ));
    content
}

/// Take the first `depth` levels as delivered and sort them by price, highest first
pub fn display_levels(levels: &[PriceLevel], depth: usize) -> Vec<PriceLevel> {
    let mut shown: Vec<PriceLevel> = levels.iter().take(depth).copied().collect();
    shown.sort_by(|a, b| b.price.cmp(&a.price));
    shown
}

/// Largest quantity on a side; 1 when the side is empty or has no positive quantity
pub fn max_quantity(levels: &[PriceLevel]) -> Decimal {
    levels
        .iter()
        .map(|level| level.quantity)
        .max()
        .filter(|max| *max > Decimal::ZERO)
        .unwrap_or(Decimal::ONE)
}

/// `round(quantity / max * 10)`, never shorter than 1; an overflowing ratio gets 1
pub fn bar_length(quantity: Decimal, max_quantity: Decimal) -> usize {
    if max_quantity <= Decimal::ZERO {
        return 1;
    }
    quantity
        .checked_div(max_quantity)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(BAR_SCALE)))
        .and_then(|scaled| {
            scaled
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_usize()
        })
        .unwrap_or(0)
        .max(1)
}

/// One line per level: fixed-width price, fixed-width quantity, bar
pub fn render_bars(levels: &[PriceLevel], max_quantity: Decimal, side: Side) -> Vec<ContentLine> {
    let (marker, tone) = match side {
        Side::Bid => (BID_MARKER, Tone::Bid),
        Side::Ask => (ASK_MARKER, Tone::Ask),
    };

    levels
        .iter()
        .map(|level| {
            let price = level
                .price
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let quantity = level
                .quantity
                .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
            let bar: String = std::iter::repeat(marker)
                .take(bar_length(level.quantity, max_quantity))
                .collect();

            ContentLine::plain(format!(
                "{:>pw$.2} | {:>qw$.4} | ",
                price,
                quantity,
                pw = PRICE_WIDTH,
                qw = QTY_WIDTH
            ))
            .push(bar, tone)
        })
        .collect()
}

fn spread_line(metrics: &BookMetrics) -> ContentLine {
    match (metrics.spread, metrics.spread_bps) {
        (Some(spread), Some(bps)) => {
            let tone = if metrics.is_crossed() {
                Tone::Warning
            } else {
                Tone::Muted
            };
            ContentLine::toned(
                format!(
                    "Spread: {} ({:.2} bps)",
                    spread.normalize(),
                    bps.round_dp(2)
                ),
                tone,
            )
        }
        _ => ContentLine::toned("Spread: -", Tone::Muted),
    }
}
