//! Market state store
//!
//! One explicit state object fed by the four feeds. Every update is a pure
//! in-memory mutation; an update whose required field is missing or invalid is
//! skipped and reported through the `bool` return value.

use rust_decimal::Decimal;

use super::{BoundedBuffer, OrderBook, TradeRecord};
use crate::config::Config;
use crate::parser::{DepthEvent, FeedMessage, KlineEvent, TickerEvent, TradeEvent};

/// Buffer capacities of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacities {
    /// Price and volume series
    pub series: usize,
    /// Trade tape
    pub trades: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            series: 200,
            trades: 120,
        }
    }
}

impl From<&Config> for Capacities {
    fn from(config: &Config) -> Self {
        Self {
            series: config.price_history,
            trades: config.trade_history,
        }
    }
}

/// Live market state for one instrument
#[derive(Debug, Clone)]
pub struct MarketState {
    prices: BoundedBuffer<Decimal>,
    volumes: BoundedBuffer<Decimal>,
    book: OrderBook,
    trades: BoundedBuffer<TradeRecord>,
    ticker: Option<TickerEvent>,
}

/// Consistent copy of the whole state taken for one render cycle
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub prices: Vec<Decimal>,
    pub volumes: Vec<Decimal>,
    pub book: OrderBook,
    pub trades: Vec<TradeRecord>,
    pub ticker: Option<TickerEvent>,
}

impl MarketState {
    pub fn new(capacities: Capacities) -> Self {
        Self {
            prices: BoundedBuffer::new(capacities.series),
            volumes: BoundedBuffer::new(capacities.series),
            book: OrderBook::new(),
            trades: BoundedBuffer::new(capacities.trades),
            ticker: None,
        }
    }

    /// Route a decoded message to its update. Returns false if it was skipped.
    pub fn apply(&mut self, message: FeedMessage) -> bool {
        match message {
            FeedMessage::Trade(event) => self.on_trade(&event),
            FeedMessage::Depth(event) => self.on_depth(event),
            FeedMessage::Ticker(event) => self.on_ticker(event),
            FeedMessage::Kline(event) => self.on_kline(&event),
        }
    }

    /// Append a trade to the tape. Trades without a price are skipped.
    pub fn on_trade(&mut self, event: &TradeEvent) -> bool {
        let Some(price) = event.price else {
            return false;
        };
        let quantity = event.quantity.unwrap_or(Decimal::ZERO);

        self.trades.push(TradeRecord::new(
            event.trade_time,
            event.is_buyer_maker,
            quantity,
            price,
        ));
        true
    }

    /// Replace the order book. Snapshots missing either side are skipped.
    pub fn on_depth(&mut self, event: DepthEvent) -> bool {
        let (Some(bids), Some(asks)) = (event.bids, event.asks) else {
            return false;
        };

        self.book.replace(bids, asks, event.event_time);
        true
    }

    /// Replace the ticker snapshot
    pub fn on_ticker(&mut self, event: TickerEvent) -> bool {
        self.ticker = Some(event);
        true
    }

    /// Append close price and volume; each series is updated independently.
    /// A missing volume is appended as zero.
    pub fn on_kline(&mut self, event: &KlineEvent) -> bool {
        let Some(candle) = &event.candle else {
            return false;
        };

        let mut applied = false;
        if let Some(close) = candle.close {
            self.prices.push(close);
            applied = true;
        }
        if let Some(volume) = candle.volume.or_zero() {
            self.volumes.push(volume);
            applied = true;
        }
        applied
    }

    pub fn prices(&self) -> &BoundedBuffer<Decimal> {
        &self.prices
    }

    pub fn volumes(&self) -> &BoundedBuffer<Decimal> {
        &self.volumes
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn trades(&self) -> &BoundedBuffer<TradeRecord> {
        &self.trades
    }

    pub fn ticker(&self) -> Option<&TickerEvent> {
        self.ticker.as_ref()
    }

    /// Copy every slice at once for rendering
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            prices: self.prices.to_vec(),
            volumes: self.volumes.to_vec(),
            book: self.book.clone(),
            trades: self.trades.to_vec(),
            ticker: self.ticker.clone(),
        }
    }
}

impl Default for MarketState {
    fn default() -> Self {
        Self::new(Capacities::default())
    }
}
