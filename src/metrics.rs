//! Per-feed counters
//!
//! Prometheus counters labelled by feed. Nothing exports them; the dashboard
//! reads them back for the feed status panel and the periodic status log.

use prometheus::{IntCounter, IntCounterVec, Opts};

use crate::error::Result;
use crate::instrument::FeedKind;
use crate::websocket::ConnectionState;

/// Counters shared by the subscriptions and the dashboard
#[derive(Clone)]
pub struct FeedMetrics {
    messages: IntCounterVec,
    decode_failures: IntCounterVec,
    skipped_updates: IntCounterVec,
    reconnects: IntCounterVec,
    render_cycles: IntCounter,
}

impl FeedMetrics {
    pub fn new() -> Result<Self> {
        let messages = IntCounterVec::new(
            Opts::new("feed_messages_total", "Decoded feed messages"),
            &["feed"],
        )?;
        let decode_failures = IntCounterVec::new(
            Opts::new("feed_decode_failures_total", "Feed payloads that failed to decode"),
            &["feed"],
        )?;
        let skipped_updates = IntCounterVec::new(
            Opts::new(
                "feed_skipped_updates_total",
                "Decoded messages skipped for a missing or invalid field",
            ),
            &["feed"],
        )?;
        let reconnects = IntCounterVec::new(
            Opts::new("feed_reconnects_total", "Scheduled reconnect attempts"),
            &["feed"],
        )?;
        let render_cycles = IntCounter::new("render_cycles_total", "Completed render cycles")?;

        Ok(Self {
            messages,
            decode_failures,
            skipped_updates,
            reconnects,
            render_cycles,
        })
    }

    pub fn record_message(&self, kind: FeedKind) {
        self.messages.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_decode_failure(&self, kind: FeedKind) {
        self.decode_failures.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_skipped(&self, kind: FeedKind) {
        self.skipped_updates.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_reconnect(&self, kind: FeedKind) {
        self.reconnects.with_label_values(&[kind.as_str()]).inc();
    }

    pub fn record_render(&self) {
        self.render_cycles.inc();
    }

    pub fn render_cycles(&self) -> u64 {
        self.render_cycles.get()
    }

    /// Current counter values for one feed
    pub fn counts(&self, kind: FeedKind) -> FeedCounts {
        let label = [kind.as_str()];
        FeedCounts {
            messages: self.messages.with_label_values(&label).get(),
            decode_failures: self.decode_failures.with_label_values(&label).get(),
            skipped_updates: self.skipped_updates.with_label_values(&label).get(),
            reconnects: self.reconnects.with_label_values(&label).get(),
        }
    }
}

impl std::fmt::Debug for FeedMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedMetrics")
            .field("render_cycles", &self.render_cycles.get())
            .finish()
    }
}

/// Counter values for one feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedCounts {
    pub messages: u64,
    pub decode_failures: u64,
    pub skipped_updates: u64,
    pub reconnects: u64,
}

/// What the status panel shows for one subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStatus {
    pub stream: String,
    pub kind: FeedKind,
    pub state: ConnectionState,
    pub counts: FeedCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_feed() {
        let metrics = FeedMetrics::new().unwrap();
        metrics.record_message(FeedKind::Trade);
        metrics.record_message(FeedKind::Trade);
        metrics.record_decode_failure(FeedKind::Depth);
        metrics.record_skipped(FeedKind::Kline);
        metrics.record_reconnect(FeedKind::Ticker);
        metrics.record_render();

        assert_eq!(metrics.counts(FeedKind::Trade).messages, 2);
        assert_eq!(metrics.counts(FeedKind::Trade).decode_failures, 0);
        assert_eq!(metrics.counts(FeedKind::Depth).decode_failures, 1);
        assert_eq!(metrics.counts(FeedKind::Kline).skipped_updates, 1);
        assert_eq!(metrics.counts(FeedKind::Ticker).reconnects, 1);
        assert_eq!(metrics.render_cycles(), 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = FeedMetrics::new().unwrap();
        let b = FeedMetrics::new().unwrap();
        a.record_message(FeedKind::Trade);
        assert_eq!(b.counts(FeedKind::Trade).messages, 0);
    }
}
