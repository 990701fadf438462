//! Benchmarks for market state updates and panel building

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use market_terminal::instrument::FeedKind;
use market_terminal::market::{Capacities, MarketState};
use market_terminal::parser::{DepthEvent, FeedMessage, PriceLevel, TradeEvent};
use market_terminal::view;
use rust_decimal::Decimal;
use std::str::FromStr;

const DEPTH_PAYLOAD: &str = r#"{"e":"depthUpdate","E":1700000000000,"b":[["50000.10","1.5"],["49999.90","0.2"],["49999.50","3.0"]],"a":[["50000.20","0.7"],["50000.40","1.1"],["50001.00","2.4"]]}"#;

fn create_depth(levels: usize) -> DepthEvent {
    let quantity = Decimal::from_str("1.5").unwrap();
    let bids = (0..levels)
        .map(|i| PriceLevel::new(Decimal::from(50000 - i as i64), quantity))
        .collect();
    let asks = (0..levels)
        .map(|i| PriceLevel::new(Decimal::from(50001 + i as i64), quantity))
        .collect();

    DepthEvent {
        event_time: Some(1_700_000_000_000),
        bids: Some(bids),
        asks: Some(asks),
    }
}

fn create_trade(price: i64) -> TradeEvent {
    TradeEvent {
        price: Some(Decimal::from(price)),
        quantity: Some(Decimal::from_str("0.015").unwrap()),
        trade_time: Some(1_700_000_000_000),
        is_buyer_maker: price % 2 == 0,
        ..TradeEvent::default()
    }
}

fn benchmark_trade_on_full_tape(c: &mut Criterion) {
    let mut state = MarketState::new(Capacities::default());
    for i in 0..200 {
        state.on_trade(&create_trade(50000 + i));
    }
    let trade = create_trade(50123);

    c.bench_function("on_trade_full_tape", |b| {
        b.iter(|| {
            black_box(state.on_trade(black_box(&trade)));
        })
    });
}

fn benchmark_depth_replace(c: &mut Criterion) {
    let mut state = MarketState::default();
    let depth = create_depth(20);

    c.bench_function("on_depth_20_levels", |b| {
        b.iter(|| {
            black_box(state.on_depth(black_box(depth.clone())));
        })
    });
}

fn benchmark_parse_depth(c: &mut Criterion) {
    c.bench_function("parse_depth_payload", |b| {
        b.iter(|| {
            black_box(FeedMessage::parse(FeedKind::Depth, black_box(DEPTH_PAYLOAD)).ok());
        })
    });
}

fn benchmark_build_panels(c: &mut Criterion) {
    let mut state = MarketState::default();
    state.on_depth(create_depth(20));
    for i in 0..120 {
        state.on_trade(&create_trade(50000 + i));
    }
    let snapshot = state.snapshot();

    c.bench_function("build_orderbook_panel", |b| {
        b.iter(|| {
            black_box(view::orderbook::build(black_box(&snapshot.book), 8));
        })
    });

    c.bench_function("build_trades_panel", |b| {
        b.iter(|| {
            black_box(view::trades::build(black_box(&snapshot.trades)));
        })
    });
}

criterion_group!(
    benches,
    benchmark_trade_on_full_tape,
    benchmark_depth_replace,
    benchmark_parse_depth,
    benchmark_build_panels
);
criterion_main!(benches);
