//! Market Terminal
//!
//! Real-time market data for one Binance instrument: live trades, the
//! partial order book, the 24h ticker and candle closes, streamed over
//! WebSocket and painted into a terminal dashboard.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod input;
pub mod instrument;
pub mod market;
pub mod metrics;
pub mod parser;
pub mod render;
pub mod view;
pub mod websocket;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Result, TerminalError};
pub use input::ExitReason;
pub use instrument::{DepthParams, FeedKind, Instrument};
pub use market::{MarketSnapshot, MarketState, OrderBook, TradeRecord};
pub use metrics::FeedMetrics;
pub use parser::FeedMessage;
pub use render::{Panel, PanelSink, Renderer, TerminalSink};
pub use websocket::{StreamManager, SubscriptionHandle, WebSocketConnector};
