//! One feed subscription and its reconnect state machine
//!
//! `Connecting -> Connected -> PendingRetry -> Connecting -> ...` with no
//! terminal state. Every termination, including a failed connect, waits the
//! same fixed delay before the next attempt.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{Connection, Connector};
use crate::error::Result;
use crate::instrument::FeedKind;
use crate::metrics::{FeedMetrics, FeedStatus};
use crate::parser::FeedMessage;

/// Connection state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    PendingRetry,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::PendingRetry => "retry pending",
        }
    }
}

/// A persistent subscription to one stream
pub struct Subscription<C, H> {
    stream: String,
    kind: FeedKind,
    url: String,
    connector: Arc<C>,
    on_message: H,
    reconnect_delay: Duration,
    state: watch::Sender<ConnectionState>,
    metrics: FeedMetrics,
}

impl<C, H> Subscription<C, H>
where
    C: Connector,
    H: Fn(FeedMessage) + Send + Sync + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stream: String,
        kind: FeedKind,
        url: String,
        connector: Arc<C>,
        on_message: H,
        reconnect_delay: Duration,
        state: watch::Sender<ConnectionState>,
        metrics: FeedMetrics,
    ) -> Self {
        Self {
            stream,
            kind,
            url,
            connector,
            on_message,
            reconnect_delay,
            state,
            metrics,
        }
    }

    /// Run until the process exits
    pub async fn run(self) {
        loop {
            self.state.send_replace(ConnectionState::Connecting);

            match self.connect_and_process().await {
                Ok(()) => info!(stream = %self.stream, "Subscription ended"),
                Err(e) => warn!(stream = %self.stream, error = %e, "Subscription dropped"),
            }

            self.state.send_replace(ConnectionState::PendingRetry);
            self.metrics.record_reconnect(self.kind);
            info!(
                stream = %self.stream,
                delay_ms = self.reconnect_delay.as_millis() as u64,
                "Reconnecting after fixed delay"
            );
            sleep(self.reconnect_delay).await;
        }
    }

    /// Connect and process messages until the connection terminates
    async fn connect_and_process(&self) -> Result<()> {
        let mut connection = self.connector.connect(&self.url).await?;
        self.state.send_replace(ConnectionState::Connected);
        info!(stream = %self.stream, "Subscription connected");

        loop {
            if let Some(text) = connection.recv().await? {
                self.dispatch(&text);
            }
        }
    }

    /// Decode one payload and hand it to the handler; malformed payloads are dropped
    fn dispatch(&self, raw: &str) {
        match FeedMessage::parse(self.kind, raw) {
            Ok(message) => {
                self.metrics.record_message(self.kind);
                (self.on_message)(message);
            }
            Err(e) => {
                self.metrics.record_decode_failure(self.kind);
                warn!(stream = %self.stream, error = %e, "Dropping malformed message");
                debug!(stream = %self.stream, payload = %raw, "Malformed payload");
            }
        }
    }
}

/// Handle to a running subscription
#[derive(Debug)]
pub struct SubscriptionHandle {
    stream: String,
    kind: FeedKind,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        stream: String,
        kind: FeedKind,
        state: watch::Receiver<ConnectionState>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            stream,
            kind,
            state,
            task,
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Whether the subscription task is still running
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// State and counters for the status panel
    pub fn status(&self, metrics: &FeedMetrics) -> FeedStatus {
        FeedStatus {
            stream: self.stream.clone(),
            kind: self.kind,
            state: self.state(),
            counts: metrics.counts(self.kind),
        }
    }
}
