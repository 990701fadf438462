//! Dashboard task
//!
//! Owns the market state. Feed messages are applied as they arrive and the
//! screen is repainted on a fixed period, so a burst of updates between two
//! ticks costs a single render.

use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::input::ExitReason;
use crate::instrument::{FeedKind, Instrument};
use crate::market::{Capacities, MarketState};
use crate::metrics::{FeedMetrics, FeedStatus};
use crate::parser::FeedMessage;
use crate::render::{PanelSink, Renderer};
use crate::websocket::SubscriptionHandle;

/// Message handler that forwards decoded messages to the dashboard task
///
/// Once the dashboard has stopped, messages are dropped and logged at debug.
pub fn forwarder(tx: UnboundedSender<FeedMessage>) -> impl Fn(FeedMessage) + Send + Sync + 'static {
    move |message| {
        if let Err(e) = tx.send(message) {
            debug!(feed = %e.0.kind(), "Dashboard gone, dropping message");
        }
    }
}

pub struct Dashboard {
    state: MarketState,
    renderer: Renderer,
    feeds: Vec<SubscriptionHandle>,
    metrics: FeedMetrics,
    render_interval: Duration,
    status_interval: Duration,
}

impl Dashboard {
    pub fn new(
        config: &Config,
        instrument: Instrument,
        feeds: Vec<SubscriptionHandle>,
        metrics: FeedMetrics,
    ) -> Self {
        Self {
            state: MarketState::new(Capacities::from(config)),
            renderer: Renderer::new(instrument, config.book_display_levels),
            feeds,
            metrics,
            render_interval: Duration::from_millis(config.render_interval_ms),
            status_interval: Duration::from_secs(config.status_log_interval_secs),
        }
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    /// Apply one decoded message, counting it if it had to be skipped
    pub fn apply(&mut self, message: FeedMessage) {
        let kind = message.kind();
        if !self.state.apply(message) {
            self.metrics.record_skipped(kind);
            debug!(feed = %kind, "Skipped update with missing fields");
        }
    }

    pub fn feed_statuses(&self) -> Vec<FeedStatus> {
        self.feeds
            .iter()
            .map(|feed| feed.status(&self.metrics))
            .collect()
    }

    /// Snapshot the state and paint every panel once
    pub fn render_cycle<S>(&self, sink: &mut S) -> Result<()>
    where
        S: PanelSink + ?Sized,
    {
        let snapshot = self.state.snapshot();
        let feeds = self.feed_statuses();
        self.renderer
            .render(&snapshot, &feeds, self.metrics.render_cycles(), sink)?;
        self.metrics.record_render();
        Ok(())
    }

    /// Periodic one-line summary in the log file
    pub fn log_status(&self) {
        let book = self.state.book();
        let figures = book.metrics();
        let trade = self.metrics.counts(FeedKind::Trade);
        let depth = self.metrics.counts(FeedKind::Depth);
        let ticker = self.metrics.counts(FeedKind::Ticker);
        let kline = self.metrics.counts(FeedKind::Kline);

        info!(
            instrument = %self.renderer.instrument(),
            best_bid = ?book.best_bid(),
            best_ask = ?book.best_ask(),
            spread_bps = ?figures.spread_bps,
            imbalance = ?figures.imbalance,
            depth_ratio = ?figures.depth_ratio(),
            crossed = figures.is_crossed(),
            book_healthy = figures.is_healthy(),
            prices = self.state.prices().len(),
            trades = self.state.trades().len(),
            trade_msgs = trade.messages,
            depth_msgs = depth.messages,
            ticker_msgs = ticker.messages,
            kline_msgs = kline.messages,
            decode_failures = trade.decode_failures
                + depth.decode_failures
                + ticker.decode_failures
                + kline.decode_failures,
            render_cycles = self.metrics.render_cycles(),
            "Market status"
        );

        for feed in &self.feeds {
            if !feed.is_running() {
                warn!(stream = %feed.stream(), "Subscription task is no longer running");
            }
        }
    }

    /// Apply messages and repaint until an exit reason arrives
    pub async fn run<S>(
        mut self,
        mut messages: UnboundedReceiver<FeedMessage>,
        mut exit: UnboundedReceiver<ExitReason>,
        sink: &mut S,
    ) -> Result<ExitReason>
    where
        S: PanelSink + ?Sized,
    {
        let mut render_tick = interval(self.render_interval);
        render_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut status_tick = interval_at(Instant::now() + self.status_interval, self.status_interval);
        status_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut feeds_open = true;
        let mut exit_open = true;

        info!(
            instrument = %self.renderer.instrument(),
            feeds = self.feeds.len(),
            render_ms = self.render_interval.as_millis() as u64,
            "Dashboard started"
        );

        loop {
            tokio::select! {
                reason = exit.recv(), if exit_open => match reason {
                    Some(reason) => {
                        info!(reason = %reason, "Dashboard stopping");
                        return Ok(reason);
                    }
                    None => {
                        debug!("Exit channel closed");
                        exit_open = false;
                    }
                },
                message = messages.recv(), if feeds_open => match message {
                    Some(message) => self.apply(message),
                    None => {
                        warn!("All feed senders dropped");
                        feeds_open = false;
                    }
                },
                _ = render_tick.tick() => {
                    if let Err(e) = self.render_cycle(sink) {
                        warn!(error = %e, "Render failed");
                        return Err(e);
                    }
                }
                _ = status_tick.tick() => self.log_status(),
            }
        }
    }
}
