//! Parser module for Binance WebSocket messages
//!
//! Each feed has an explicit schema. Payloads that are not valid JSON or that
//! carry a field of the wrong shape fail to decode; fields that are merely
//! absent or hold an unparsable number decode to `None` and are left for the
//! market state to skip.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::error::{Result, TerminalError};
use crate::instrument::FeedKind;

/// Binance trade message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeEvent {
    /// Symbol
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,

    /// Price
    #[serde(rename = "p", default, deserialize_with = "deserialize_lenient_decimal")]
    pub price: Option<Decimal>,

    /// Quantity
    #[serde(rename = "q", default, deserialize_with = "deserialize_lenient_decimal")]
    pub quantity: Option<Decimal>,

    /// Trade time (epoch milliseconds)
    #[serde(rename = "T", default)]
    pub trade_time: Option<i64>,

    /// Is buyer maker
    #[serde(rename = "m", default)]
    pub is_buyer_maker: bool,
}

/// Partial depth message: the top levels of both sides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepthEvent {
    /// Event time
    #[serde(rename = "E", default)]
    pub event_time: Option<i64>,

    /// Bids, best first
    #[serde(
        rename = "b",
        alias = "bids",
        default,
        deserialize_with = "deserialize_price_levels"
    )]
    pub bids: Option<Vec<PriceLevel>>,

    /// Asks, best first
    #[serde(
        rename = "a",
        alias = "asks",
        default,
        deserialize_with = "deserialize_price_levels"
    )]
    pub asks: Option<Vec<PriceLevel>>,
}

/// 24h rolling ticker message
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TickerEvent {
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,

    #[serde(rename = "E", default)]
    pub event_time: Option<i64>,

    #[serde(rename = "p", default, deserialize_with = "deserialize_lenient_decimal")]
    pub price_change: Option<Decimal>,

    #[serde(rename = "P", default, deserialize_with = "deserialize_lenient_decimal")]
    pub price_change_percent: Option<Decimal>,

    #[serde(rename = "w", default, deserialize_with = "deserialize_lenient_decimal")]
    pub weighted_avg_price: Option<Decimal>,

    #[serde(rename = "c", default, deserialize_with = "deserialize_lenient_decimal")]
    pub last_price: Option<Decimal>,

    #[serde(rename = "Q", default, deserialize_with = "deserialize_lenient_decimal")]
    pub last_quantity: Option<Decimal>,

    #[serde(rename = "o", default, deserialize_with = "deserialize_lenient_decimal")]
    pub open_price: Option<Decimal>,

    #[serde(rename = "h", default, deserialize_with = "deserialize_lenient_decimal")]
    pub high_price: Option<Decimal>,

    #[serde(rename = "l", default, deserialize_with = "deserialize_lenient_decimal")]
    pub low_price: Option<Decimal>,

    /// Base asset volume
    #[serde(rename = "v", default, deserialize_with = "deserialize_lenient_decimal")]
    pub volume: Option<Decimal>,

    /// Quote asset volume
    #[serde(rename = "q", default, deserialize_with = "deserialize_lenient_decimal")]
    pub quote_volume: Option<Decimal>,

    /// Number of trades in the window
    #[serde(rename = "n", default)]
    pub trade_count: Option<u64>,
}

/// Kline message wrapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "E", default)]
    pub event_time: Option<i64>,

    /// The candle itself
    #[serde(rename = "k", default)]
    pub candle: Option<Candle>,
}

/// Candle payload nested in a kline message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candle {
    /// Candle open time
    #[serde(rename = "t", default)]
    pub open_time: Option<i64>,

    #[serde(rename = "o", default, deserialize_with = "deserialize_lenient_decimal")]
    pub open: Option<Decimal>,

    #[serde(rename = "h", default, deserialize_with = "deserialize_lenient_decimal")]
    pub high: Option<Decimal>,

    #[serde(rename = "l", default, deserialize_with = "deserialize_lenient_decimal")]
    pub low: Option<Decimal>,

    #[serde(rename = "c", default, deserialize_with = "deserialize_lenient_decimal")]
    pub close: Option<Decimal>,

    /// Base asset volume; an absent value counts as zero
    #[serde(rename = "v", default, deserialize_with = "deserialize_numeric_value")]
    pub volume: NumericValue,

    /// Whether this candle is closed
    #[serde(rename = "x", default)]
    pub is_closed: bool,
}

/// A numeric field that keeps "absent" apart from "present but unparsable"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericValue {
    #[default]
    Absent,
    Invalid,
    Valid(Decimal),
}

impl NumericValue {
    pub fn valid(self) -> Option<Decimal> {
        match self {
            NumericValue::Valid(value) => Some(value),
            _ => None,
        }
    }

    /// Absent counts as zero; an unparsable value stays `None`
    pub fn or_zero(self) -> Option<Decimal> {
        match self {
            NumericValue::Absent => Some(Decimal::ZERO),
            NumericValue::Invalid => None,
            NumericValue::Valid(value) => Some(value),
        }
    }
}

impl From<Decimal> for NumericValue {
    fn from(value: Decimal) -> Self {
        NumericValue::Valid(value)
    }
}

/// Price level (price, quantity pair)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// Decoded feed message
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Trade(TradeEvent),
    Depth(DepthEvent),
    Ticker(TickerEvent),
    Kline(KlineEvent),
}

impl FeedMessage {
    /// Parse a raw WebSocket text payload for the given feed
    pub fn parse(kind: FeedKind, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let payload = unwrap_stream_envelope(value);

        if !payload.is_object() {
            return Err(TerminalError::ParseError(format!(
                "expected a JSON object for {} payload",
                kind
            )));
        }

        let message = match kind {
            FeedKind::Trade => FeedMessage::Trade(serde_json::from_value(payload)?),
            FeedKind::Depth => FeedMessage::Depth(serde_json::from_value(payload)?),
            FeedKind::Ticker => FeedMessage::Ticker(serde_json::from_value(payload)?),
            FeedKind::Kline => FeedMessage::Kline(serde_json::from_value(payload)?),
        };

        Ok(message)
    }

    /// Feed this message belongs to
    pub fn kind(&self) -> FeedKind {
        match self {
            FeedMessage::Trade(_) => FeedKind::Trade,
            FeedMessage::Depth(_) => FeedKind::Depth,
            FeedMessage::Ticker(_) => FeedKind::Ticker,
            FeedMessage::Kline(_) => FeedKind::Kline,
        }
    }
}

/// Combined streams wrap the payload as `{"stream": ..., "data": ...}`
fn unwrap_stream_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.get("stream").map_or(false, Value::is_string) && map.contains_key("data") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Numbers arrive either as JSON strings or as JSON numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericField {
    Text(String),
    Number(serde_json::Number),
}

impl NumericField {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            NumericField::Text(text) => parse_decimal(text.trim()),
            NumericField::Number(number) => parse_decimal(&number.to_string()),
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Deserialize an optional number, mapping unparsable text to `None`
fn deserialize_lenient_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumericField> = Deserialize::deserialize(deserializer)?;
    Ok(raw.and_then(|field| field.to_decimal()))
}

/// Deserialize a number into [`NumericValue`]; `null` and `""` count as absent
fn deserialize_numeric_value<'de, D>(deserializer: D) -> std::result::Result<NumericValue, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumericField> = Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        None => NumericValue::Absent,
        Some(NumericField::Text(text)) if text.is_empty() => NumericValue::Absent,
        Some(field) => field
            .to_decimal()
            .map_or(NumericValue::Invalid, NumericValue::Valid),
    })
}

/// Deserialize an optional array of `[price, quantity]` pairs
fn deserialize_price_levels<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<PriceLevel>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Vec<NumericField>>> = Deserialize::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    raw.into_iter()
        .map(|pair| {
            if pair.len() != 2 {
                return Err(serde::de::Error::custom("Invalid price level format"));
            }
            let price = pair[0]
                .to_decimal()
                .ok_or_else(|| serde::de::Error::custom("Invalid price level price"))?;
            let quantity = pair[1]
                .to_decimal()
                .ok_or_else(|| serde::de::Error::custom("Invalid price level quantity"))?;
            Ok(PriceLevel { price, quantity })
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_trade() {
        let raw = r#"{
            "e": "trade",
            "E": 1700000000001,
            "s": "BTCUSDT",
            "t": 12345,
            "p": "50000.5",
            "q": "0.01",
            "T": 1700000000000,
            "m": true
        }"#;

        let msg = FeedMessage::parse(FeedKind::Trade, raw).unwrap();
        if let FeedMessage::Trade(trade) = msg {
            assert_eq!(trade.symbol.as_deref(), Some("BTCUSDT"));
            assert_eq!(trade.price, Some(dec!(50000.5)));
            assert_eq!(trade.quantity, Some(dec!(0.01)));
            assert_eq!(trade.trade_time, Some(1_700_000_000_000));
            assert!(trade.is_buyer_maker);
        } else {
            panic!("Expected Trade");
        }
    }

    #[test]
    fn test_parse_trade_without_price() {
        let msg = FeedMessage::parse(FeedKind::Trade, r#"{"q": "1", "m": false}"#).unwrap();
        match msg {
            FeedMessage::Trade(trade) => assert!(trade.price.is_none()),
            other => panic!("Expected Trade, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_number_is_absent() {
        let msg = FeedMessage::parse(FeedKind::Trade, r#"{"p": "abc", "q": "1"}"#).unwrap();
        match msg {
            FeedMessage::Trade(trade) => {
                assert!(trade.price.is_none());
                assert_eq!(trade.quantity, Some(dec!(1)));
            }
            other => panic!("Expected Trade, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_depth_numbers_and_strings() {
        let raw = r#"{"b": [[100, 2], ["99", "1"]], "a": [["101", "3"], [102, 1]]}"#;
        let msg = FeedMessage::parse(FeedKind::Depth, raw).unwrap();
        if let FeedMessage::Depth(depth) = msg {
            let bids = depth.bids.unwrap();
            let asks = depth.asks.unwrap();
            assert_eq!(bids[0], PriceLevel::new(dec!(100), dec!(2)));
            assert_eq!(bids[1], PriceLevel::new(dec!(99), dec!(1)));
            assert_eq!(asks[0], PriceLevel::new(dec!(101), dec!(3)));
            assert_eq!(asks[1], PriceLevel::new(dec!(102), dec!(1)));
        } else {
            panic!("Expected Depth");
        }
    }

    #[test]
    fn test_parse_depth_rest_style_aliases() {
        let raw = r#"{"lastUpdateId": 1, "bids": [["10", "1"]], "asks": []}"#;
        let msg = FeedMessage::parse(FeedKind::Depth, raw).unwrap();
        if let FeedMessage::Depth(depth) = msg {
            assert_eq!(depth.bids.map(|b| b.len()), Some(1));
            assert_eq!(depth.asks.map(|a| a.len()), Some(0));
        } else {
            panic!("Expected Depth");
        }
    }

    #[test]
    fn test_depth_missing_side_decodes_as_none() {
        let msg = FeedMessage::parse(FeedKind::Depth, r#"{"b": [["1", "1"]]}"#).unwrap();
        if let FeedMessage::Depth(depth) = msg {
            assert!(depth.bids.is_some());
            assert!(depth.asks.is_none());
        } else {
            panic!("Expected Depth");
        }
    }

    #[test]
    fn test_malformed_depth_level_is_decode_failure() {
        let raw = r#"{"b": [["100"]], "a": []}"#;
        assert!(FeedMessage::parse(FeedKind::Depth, raw).is_err());

        let raw = r#"{"b": [["x", "1"]], "a": []}"#;
        assert!(FeedMessage::parse(FeedKind::Depth, raw).is_err());
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            FeedMessage::parse(FeedKind::Trade, "{not json"),
            Err(TerminalError::ParseError(_))
        ));
        assert!(FeedMessage::parse(FeedKind::Ticker, "[1, 2]").is_err());
        assert!(FeedMessage::parse(FeedKind::Ticker, "null").is_err());
        // wrong shape for the maker flag
        assert!(FeedMessage::parse(FeedKind::Trade, r#"{"p": "1", "m": "yes"}"#).is_err());
    }

    #[test]
    fn test_parse_kline() {
        let raw = r#"{
            "e": "kline",
            "E": 1700000000000,
            "s": "BTCUSDT",
            "k": {"t": 1699999980000, "o": "49990", "h": "50010", "l": "49980",
                  "c": "50000.1", "v": "12.5", "x": false}
        }"#;
        let msg = FeedMessage::parse(FeedKind::Kline, raw).unwrap();
        if let FeedMessage::Kline(kline) = msg {
            let candle = kline.candle.unwrap();
            assert_eq!(candle.close, Some(dec!(50000.1)));
            assert_eq!(candle.volume, NumericValue::Valid(dec!(12.5)));
            assert!(!candle.is_closed);
        } else {
            panic!("Expected Kline");
        }

        let msg = FeedMessage::parse(FeedKind::Kline, r#"{"e": "kline"}"#).unwrap();
        if let FeedMessage::Kline(kline) = msg {
            assert!(kline.candle.is_none());
        } else {
            panic!("Expected Kline");
        }
    }

    #[test]
    fn test_kline_volume_absent_vs_invalid() {
        let volume = |raw: &str| match FeedMessage::parse(FeedKind::Kline, raw).unwrap() {
            FeedMessage::Kline(kline) => kline.candle.unwrap().volume,
            other => panic!("Expected Kline, got {:?}", other),
        };

        assert_eq!(volume(r#"{"k": {"c": "100"}}"#), NumericValue::Absent);
        assert_eq!(volume(r#"{"k": {"c": "100", "v": null}}"#), NumericValue::Absent);
        assert_eq!(volume(r#"{"k": {"c": "100", "v": ""}}"#), NumericValue::Absent);
        assert_eq!(volume(r#"{"k": {"c": "100", "v": "abc"}}"#), NumericValue::Invalid);
        assert_eq!(volume(r#"{"k": {"c": "100", "v": 3}}"#), NumericValue::Valid(dec!(3)));

        assert_eq!(NumericValue::Absent.or_zero(), Some(Decimal::ZERO));
        assert_eq!(NumericValue::Invalid.or_zero(), None);
        assert_eq!(NumericValue::Absent.valid(), None);
    }

    #[test]
    fn test_parse_ticker() {
        let raw = r#"{"e": "24hrTicker", "s": "BTCUSDT", "c": "50000", "P": "-1.25",
                      "h": "51000", "l": "49000", "v": "1234.5", "q": "61725000", "n": 99}"#;
        let msg = FeedMessage::parse(FeedKind::Ticker, raw).unwrap();
        if let FeedMessage::Ticker(ticker) = msg {
            assert_eq!(ticker.last_price, Some(dec!(50000)));
            assert_eq!(ticker.price_change_percent, Some(dec!(-1.25)));
            assert_eq!(ticker.trade_count, Some(99));
        } else {
            panic!("Expected Ticker");
        }
    }

    #[test]
    fn test_combined_stream_envelope() {
        let raw = r#"{"stream": "btcusdt@trade", "data": {"p": "1.5", "q": "2", "m": false}}"#;
        let msg = FeedMessage::parse(FeedKind::Trade, raw).unwrap();
        assert_eq!(msg.kind(), FeedKind::Trade);
        if let FeedMessage::Trade(trade) = msg {
            assert_eq!(trade.price, Some(dec!(1.5)));
        }
    }
}
