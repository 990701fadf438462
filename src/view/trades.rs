//! Live trade tape

use super::{ContentLine, PanelContent, Tone};
use crate::market::{TradeRecord, TradeSide};

/// One line per buffered trade, oldest first; the panel is scrolled to the end
/// after painting so the newest trade stays visible.
pub fn build(trades: &[TradeRecord]) -> PanelContent {
    if trades.is_empty() {
        return PanelContent::placeholder("waiting for trades...");
    }

    let mut content = PanelContent::new();
    content.extend(trades.iter().map(trade_line));
    content
}

fn trade_line(record: &TradeRecord) -> ContentLine {
    let side_tone = match record.side {
        TradeSide::Buy => Tone::Buy,
        TradeSide::Sell => Tone::Sell,
    };

    ContentLine::plain(format!("{} ", record.time))
        .push(format!(" {} ", record.side.label()), side_tone)
        .push(format!(" {:.4} @ ", record.quantity), Tone::Plain)
        .push(format!("{:.4}", record.price), Tone::Emphasis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lines_in_arrival_order() {
        let trades = vec![
            TradeRecord::new(None, false, dec!(1), dec!(200)),
            TradeRecord::new(None, true, dec!(0.01), dec!(50000.5)),
        ];
        let content = build(&trades);

        assert_eq!(content.line_count(), 2);
        assert_eq!(
            content.to_plain_text(),
            "--:--:--  BUY  1.0000 @ 200.0000\n--:--:--  SELL  0.0100 @ 50000.5000"
        );
        assert_eq!(content.lines[1].spans[1].tone, Tone::Sell);
        assert_eq!(content.lines[1].spans[3].tone, Tone::Emphasis);
    }

    #[test]
    fn test_empty_tape_placeholder() {
        let content = build(&[]);
        assert_eq!(content.line_count(), 1);
        assert_eq!(content.lines[0].spans[0].tone, Tone::Muted);
    }
}
