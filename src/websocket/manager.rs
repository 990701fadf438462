//! Stream connection manager
//!
//! Starts one independent subscription task per stream name.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use super::{ConnectionState, Connector, Subscription, SubscriptionHandle};
use crate::config::Config;
use crate::error::Result;
use crate::instrument::FeedKind;
use crate::metrics::FeedMetrics;
use crate::parser::FeedMessage;

/// Opens feed subscriptions with automatic fixed-delay reconnection
pub struct StreamManager<C> {
    connector: Arc<C>,
    endpoint: String,
    reconnect_delay: Duration,
    metrics: FeedMetrics,
}

impl<C: Connector> StreamManager<C> {
    /// Create a new stream manager
    pub fn new(connector: C, endpoint: &str, reconnect_delay: Duration, metrics: FeedMetrics) -> Self {
        Self {
            connector: Arc::new(connector),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            reconnect_delay,
            metrics,
        }
    }

    pub fn from_config(connector: C, config: &Config, metrics: FeedMetrics) -> Self {
        Self::new(
            connector,
            &config.ws_endpoint,
            Duration::from_millis(config.reconnect_delay_ms),
            metrics,
        )
    }

    /// URL of a single raw stream
    pub fn url_for(&self, stream_name: &str) -> String {
        format!("{}/{}", self.endpoint, stream_name)
    }

    /// Subscribe to `stream_name`, delivering every decoded message to `on_message`
    ///
    /// The subscription runs on its own task and reconnects after the fixed
    /// delay whenever the connection drops, for as long as the process lives.
    pub fn connect<H>(&self, stream_name: &str, on_message: H) -> Result<SubscriptionHandle>
    where
        H: Fn(FeedMessage) + Send + Sync + 'static,
    {
        let kind = FeedKind::from_stream_name(stream_name)?;
        let url = self.url_for(stream_name);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        info!(stream = %stream_name, feed = %kind, url = %url, "Starting subscription");

        let subscription = Subscription::new(
            stream_name.to_string(),
            kind,
            url,
            self.connector.clone(),
            on_message,
            self.reconnect_delay,
            state_tx,
            self.metrics.clone(),
        );
        let task = tokio::spawn(subscription.run());

        Ok(SubscriptionHandle::new(
            stream_name.to_string(),
            kind,
            state_rx,
            task,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerminalError;
    use crate::websocket::WebSocketConnector;

    #[test]
    fn test_url_for_stream() {
        let manager = StreamManager::new(
            WebSocketConnector,
            "wss://fstream.binance.com/ws/",
            Duration::from_millis(2000),
            FeedMetrics::new().unwrap(),
        );
        assert_eq!(
            manager.url_for("btcusdt@depth20@100ms"),
            "wss://fstream.binance.com/ws/btcusdt@depth20@100ms"
        );
    }

    #[test]
    fn test_rejects_unknown_stream() {
        let manager = StreamManager::from_config(
            WebSocketConnector,
            &Config::default(),
            FeedMetrics::new().unwrap(),
        );
        let result = manager.connect("btcusdt@markPrice", |_| {});
        assert!(matches!(result, Err(TerminalError::UnknownStream(_))));
    }
}
