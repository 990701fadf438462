//! Market summary with a price line chart and a volume sparkline

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{display_or_dash, ContentLine, PanelContent, Tone};
use crate::instrument::Instrument;
use crate::parser::TickerEvent;

/// Rows of the price chart
pub const CHART_HEIGHT: usize = 8;
/// Most recent points drawn
pub const CHART_WIDTH: usize = 60;

const AXIS_WIDTH: usize = 12;
const POINT: char = '•';
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Everything the market panel is drawn from
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub prices: &'a [Decimal],
    pub volumes: &'a [Decimal],
    pub ticker: Option<&'a TickerEvent>,
    pub instrument: &'a Instrument,
}

/// Build the market panel
pub fn build(input: ChartInput<'_>) -> PanelContent {
    let mut content = PanelContent::new();
    content.extend(summary_lines(&input));
    content.blank();

    let prices = tail_as_f64(input.prices, CHART_WIDTH);
    if prices.is_empty() {
        content.push(ContentLine::toned("waiting for kline updates...", Tone::Muted));
        return content;
    }

    let trend = match (prices.first(), prices.last()) {
        (Some(first), Some(last)) if last < first => Tone::Sell,
        _ => Tone::Buy,
    };
    content.extend(price_rows(&prices, CHART_HEIGHT, trend));

    let volumes = tail_as_f64(input.volumes, CHART_WIDTH);
    if !volumes.is_empty() {
        content.blank();
        content.push(
            ContentLine::toned(format!("{:>w$} ", "volume", w = AXIS_WIDTH), Tone::Muted)
                .push(sparkline(&volumes), Tone::Emphasis),
        );
    }

    content
}

fn summary_lines(input: &ChartInput<'_>) -> Vec<ContentLine> {
    let last_close = input.prices.last().copied();
    let ticker = input.ticker;
    let last = ticker.and_then(|t| t.last_price).or(last_close);

    let mut lines = vec![ContentLine::toned(
        format!("{}  ", input.instrument),
        Tone::Emphasis,
    )
    .push(format!("Last: {}", display_or_dash(last)), Tone::Plain)];

    let Some(ticker) = ticker else {
        lines.push(ContentLine::toned("24h: waiting for ticker...", Tone::Muted));
        return lines;
    };

    let change_tone = match ticker.price_change_percent {
        Some(pct) if pct < Decimal::ZERO => Tone::Sell,
        Some(_) => Tone::Buy,
        None => Tone::Muted,
    };
    let change = match (ticker.price_change_percent, ticker.price_change) {
        (Some(pct), Some(abs)) => format!("{:+.2}% ({:+})", pct, abs.normalize()),
        (Some(pct), None) => format!("{:+.2}%", pct),
        _ => "-".to_string(),
    };

    lines.push(
        ContentLine::plain("24h: ")
            .push(change, change_tone)
            .push(
                format!(
                    "  High: {}  Low: {}",
                    display_or_dash(ticker.high_price),
                    display_or_dash(ticker.low_price)
                ),
                Tone::Plain,
            ),
    );
    lines.push(ContentLine::plain(format!(
        "Vol: {}  Quote: {}  Trades: {}",
        display_or_dash(ticker.volume),
        display_or_dash(ticker.quote_volume),
        ticker
            .trade_count
            .map_or_else(|| "-".to_string(), |n| n.to_string())
    )));
    lines
}

/// Price rows, top row first, with the max/min on the axis
fn price_rows(prices: &[f64], height: usize, tone: Tone) -> Vec<ContentLine> {
    let height = height.max(2);
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let point_rows: Vec<usize> = prices
        .iter()
        .map(|price| {
            if range > 0.0 {
                (((price - min) / range) * (height - 1) as f64).round() as usize
            } else {
                (height - 1) / 2
            }
        })
        .collect();

    (0..height)
        .rev()
        .map(|row| {
            let label = if row == height - 1 {
                format!("{:.2}", max)
            } else if row == 0 {
                format!("{:.2}", min)
            } else {
                String::new()
            };
            let plot: String = point_rows
                .iter()
                .map(|point_row| if *point_row == row { POINT } else { ' ' })
                .collect();

            ContentLine::toned(format!("{:>w$} ┤", label, w = AXIS_WIDTH), Tone::Muted)
                .push(plot, tone)
        })
        .collect()
}

/// One block character per value, scaled to the largest value
pub fn sparkline(values: &[f64]) -> String {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let top = SPARK_LEVELS.len() - 1;

    values
        .iter()
        .map(|value| {
            if max <= 0.0 || *value <= 0.0 {
                SPARK_LEVELS[0]
            } else {
                let index = ((value / max) * top as f64).round() as usize;
                SPARK_LEVELS[index.min(top)]
            }
        })
        .collect()
}

fn tail_as_f64(values: &[Decimal], width: usize) -> Vec<f64> {
    let start = values.len().saturating_sub(width);
    values[start..]
        .iter()
        .filter_map(|value| value.to_f64())
        .filter(|value| value.is_finite())
        .collect()
}
