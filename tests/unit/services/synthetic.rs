//! Unit tests for the synthetic market

use chrono::{TimeZone, Utc};
use stocksignal::models::Timeframe;
use stocksignal::services::synthetic::{bar_seconds, round_cents, SyntheticMarket, CANDLE_COUNT};

fn noon() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

#[test]
fn test_round_cents() {
    assert_eq!(round_cents(1.005_1), 1.01);
    assert_eq!(round_cents(2.344), 2.34);
}

#[test]
fn test_bar_spacing() {
    assert_eq!(bar_seconds(&Timeframe::OneMinute), 60);
    assert_eq!(bar_seconds(&Timeframe::FiveMinutes), 300);
    assert_eq!(bar_seconds(&Timeframe::OneHour), 3_600);
    assert_eq!(bar_seconds(&Timeframe::OneDay), 86_400);
    assert_eq!(bar_seconds(&Timeframe::parse("weird")), 86_400);
}

#[test]
fn test_known_symbols_are_case_insensitive() {
    let market = SyntheticMarket::default();
    assert_eq!(market.symbols().len(), 5);
    assert!(market.knows("aapl"));
    assert!(!market.knows("NOPE"));
}

#[test]
fn test_prices_are_deterministic_and_positive() {
    let market = SyntheticMarket::default();
    let a = market.quote("AAPL", noon());
    let b = market.quote("aapl", noon());
    assert_eq!(a, b);
    assert_eq!(a.symbol, "AAPL");
    assert!(a.price.unwrap() > 0.0);
    assert!(a.prev_close.unwrap() > 0.0);
    assert_ne!(
        market.price_at("AAPL", noon().timestamp()),
        market.price_at("MSFT", noon().timestamp())
    );
}

#[test]
fn test_quotes_cover_every_symbol() {
    let market = SyntheticMarket::new(vec!["aapl".to_string(), "tsla".to_string()]);
    let symbols: Vec<String> = market.quotes(noon()).into_iter().map(|q| q.symbol).collect();
    assert_eq!(symbols, vec!["AAPL".to_string(), "TSLA".to_string()]);
}

#[test]
fn test_candles_are_ordered_and_consistent() {
    let market = SyntheticMarket::default();
    let candles = market.candles("MSFT", &Timeframe::OneHour, noon());
    assert_eq!(candles.len(), CANDLE_COUNT);

    for pair in candles.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    for candle in &candles {
        assert!(candle.high() >= candle.open().max(candle.close()));
        assert!(candle.low() <= candle.open().min(candle.close()));
    }
    assert_eq!(candles.last().unwrap().date, "2024-03-15 11:00:00");
}

#[test]
fn test_daily_closes_length() {
    let market = SyntheticMarket::default();
    let closes = market.daily_closes("GOOGL", 250, noon());
    assert_eq!(closes.len(), 250);
    assert!(closes.iter().all(|c| *c > 0.0));
}
