//! Render cycle and the display surface it paints into

pub mod terminal;

pub use terminal::TerminalSink;

use crate::error::Result;
use crate::instrument::Instrument;
use crate::market::MarketSnapshot;
use crate::metrics::FeedStatus;
use crate::view::{chart, orderbook, status, trades, PanelContent};

/// Independently addressable display panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Market,
    Feeds,
    OrderBook,
    Trades,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Market, Panel::Feeds, Panel::OrderBook, Panel::Trades];

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Market => "MARKET INFO",
            Panel::Feeds => "FEEDS",
            Panel::OrderBook => "ORDER BOOK",
            Panel::Trades => "LIVE TRADES",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Panel::Market => 0,
            Panel::Feeds => 1,
            Panel::OrderBook => 2,
            Panel::Trades => 3,
        }
    }
}

/// Display surface: per-panel content plus one repaint per cycle
#[cfg_attr(test, mockall::automock)]
pub trait PanelSink {
    /// Replace the content of a panel
    fn set_content(&mut self, panel: Panel, content: PanelContent);

    /// Keep the last line of a panel in view
    fn scroll_to_end(&mut self, panel: Panel);

    /// Repaint the screen
    fn flush(&mut self) -> Result<()>;
}

/// Runs the view builders over one snapshot and pushes the results
#[derive(Debug, Clone)]
pub struct Renderer {
    instrument: Instrument,
    book_levels: usize,
}

impl Renderer {
    pub fn new(instrument: Instrument, book_levels: usize) -> Self {
        Self {
            instrument,
            book_levels,
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// One render cycle: build every panel, then flush once
    pub fn render<S>(
        &self,
        snapshot: &MarketSnapshot,
        feeds: &[FeedStatus],
        render_cycles: u64,
        sink: &mut S,
    ) -> Result<()>
    where
        S: PanelSink + ?Sized,
    {
        sink.set_content(
            Panel::Market,
            chart::build(chart::ChartInput {
                prices: &snapshot.prices,
                volumes: &snapshot.volumes,
                ticker: snapshot.ticker.as_ref(),
                instrument: &self.instrument,
            }),
        );
        sink.set_content(
            Panel::OrderBook,
            orderbook::build(&snapshot.book, self.book_levels),
        );
        sink.set_content(Panel::Trades, trades::build(&snapshot.trades));
        sink.scroll_to_end(Panel::Trades);
        sink.set_content(Panel::Feeds, status::build(feeds, render_cycles));

        sink.flush()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Sink that remembers the latest content per panel and counts calls
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub contents: [Option<PanelContent>; 4],
        pub scrolled: Vec<Panel>,
        pub flushes: usize,
        pub calls: Vec<&'static str>,
    }

    impl RecordingSink {
        pub fn content(&self, panel: Panel) -> Option<&PanelContent> {
            self.contents[panel.index()].as_ref()
        }
    }

    impl PanelSink for RecordingSink {
        fn set_content(&mut self, panel: Panel, content: PanelContent) {
            self.contents[panel.index()] = Some(content);
            self.calls.push("set_content");
        }

        fn scroll_to_end(&mut self, panel: Panel) {
            self.scrolled.push(panel);
            self.calls.push("scroll_to_end");
        }

        fn flush(&mut self) -> Result<()> {
            self.flushes += 1;
            self.calls.push("flush");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;
    use crate::error::TerminalError;
    use crate::market::MarketState;
    use crate::parser::{FeedMessage, TradeEvent};
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn renderer() -> Renderer {
        Renderer::new(Instrument::new("btcusdt", "1m").unwrap(), 8)
    }

    #[test]
    fn test_empty_state_fills_every_panel() {
        let snapshot = MarketState::default().snapshot();
        let mut sink = RecordingSink::default();

        renderer().render(&snapshot, &[], 0, &mut sink).unwrap();

        for panel in Panel::ALL {
            let content = sink.content(panel).expect("panel content");
            assert!(!content.is_empty(), "{:?} is empty", panel);
        }
        assert_eq!(sink.flushes, 1);
        assert_eq!(sink.calls.last(), Some(&"flush"));
        assert_eq!(sink.scrolled, vec![Panel::Trades]);
    }

    #[test]
    fn test_one_flush_per_cycle() {
        let mut state = MarketState::default();
        state.apply(FeedMessage::Trade(TradeEvent {
            price: Some(dec!(100)),
            quantity: Some(dec!(1)),
            ..TradeEvent::default()
        }));
        let snapshot = state.snapshot();

        let mut sink = MockPanelSink::new();
        sink.expect_set_content().times(4).return_const(());
        sink.expect_scroll_to_end()
            .with(eq(Panel::Trades))
            .times(1)
            .return_const(());
        sink.expect_flush().times(1).returning(|| Ok(()));

        renderer().render(&snapshot, &[], 1, &mut sink).unwrap();
    }

    #[test]
    fn test_flush_error_is_returned() {
        let snapshot = MarketState::default().snapshot();
        let mut sink = MockPanelSink::new();
        sink.expect_set_content().return_const(());
        sink.expect_scroll_to_end().return_const(());
        sink.expect_flush()
            .returning(|| Err(TerminalError::DisplayError("backend gone".to_string())));

        let result = renderer().render(&snapshot, &[], 0, &mut sink);
        assert!(matches!(result, Err(TerminalError::DisplayError(_))));
    }
}
