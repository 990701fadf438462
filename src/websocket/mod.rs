//! WebSocket module for feed subscriptions
//!
//! The reconnect machinery only depends on the [`Connector`] and
//! [`Connection`] traits; [`WebSocketConnector`] is the tokio-tungstenite
//! implementation used in production.

mod client;
mod manager;
mod subscription;

pub use client::{WebSocketClient, WebSocketConnector};
pub use manager::StreamManager;
pub use subscription::{ConnectionState, Subscription, SubscriptionHandle};

use std::future::Future;

use crate::error::Result;

/// An open feed connection
pub trait Connection: Send {
    /// Next frame: `Ok(Some(text))` for a data payload, `Ok(None)` for a
    /// control frame, `Err` once the connection has terminated.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Opens connections to a stream URL
pub trait Connector: Send + Sync + 'static {
    type Conn: Connection + 'static;

    fn connect(&self, url: &str) -> impl Future<Output = Result<Self::Conn>> + Send;
}
