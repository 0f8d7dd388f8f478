//! Deterministic synthetic market data served by the dev backend.
//!
//! Prices are a smooth function of (symbol, unix time), so repeated requests
//! for the same instant agree and tests can pin exact values.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::f64::consts::TAU;

use crate::models::{Candle, PriceQuote, Timeframe};

pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

/// Bars returned per candlestick request
pub const CANDLE_COUNT: usize = 120;

const DAY_SECS: i64 = 86_400;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Bar spacing for a timeframe; unknown timeframes fall back to daily bars
pub fn bar_seconds(timeframe: &Timeframe) -> i64 {
    match timeframe {
        Timeframe::OneMinute => 60,
        Timeframe::FiveMinutes => 300,
        Timeframe::OneHour => 3_600,
        Timeframe::OneDay | Timeframe::Other(_) => DAY_SECS,
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticMarket {
    symbols: Vec<String>,
}

impl Default for SyntheticMarket {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect())
    }
}

impl SyntheticMarket {
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols: symbols.into_iter().map(|s| s.to_uppercase()).collect(),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn knows(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol))
    }

    /// Price of `symbol` at `unix_secs`
    pub fn price_at(&self, symbol: &str, unix_secs: i64) -> f64 {
        let seed = symbol_seed(symbol);
        let base = 50.0 + (seed % 500) as f64;
        let phase = (seed % 360) as f64 / 360.0 * TAU;
        let t = unix_secs as f64;

        // Slow 20-day swing plus a faster intraday wobble.
        let swing = (t / (20.0 * DAY_SECS as f64) * TAU + phase).sin() * 0.08;
        let wobble = (t / 5_400.0 * TAU + phase * 2.0).sin() * 0.01;
        base * (1.0 + swing + wobble)
    }

    pub fn quote(&self, symbol: &str, now: DateTime<Utc>) -> PriceQuote {
        let now_secs = now.timestamp();
        let start_of_day = now_secs - now_secs.rem_euclid(DAY_SECS);
        PriceQuote {
            symbol: symbol.to_uppercase(),
            price: Some(round_cents(self.price_at(symbol, now_secs))),
            prev_close: Some(round_cents(self.price_at(symbol, start_of_day - 1))),
            timestamp: Some(now.format(DATE_FORMAT).to_string()),
        }
    }

    pub fn quotes(&self, now: DateTime<Utc>) -> Vec<PriceQuote> {
        self.symbols.iter().map(|s| self.quote(s, now)).collect()
    }

    /// `count` closes spaced `step_secs` apart, the last one at `end`
    pub fn closes(&self, symbol: &str, count: usize, step_secs: i64, end: DateTime<Utc>) -> Vec<f64> {
        let end_secs = end.timestamp();
        (0..count)
            .rev()
            .map(|back| round_cents(self.price_at(symbol, end_secs - back as i64 * step_secs)))
            .collect()
    }

    pub fn candles(&self, symbol: &str, timeframe: &Timeframe, end: DateTime<Utc>) -> Vec<Candle> {
        let bar = bar_seconds(timeframe);
        let end_secs = end.timestamp() - end.timestamp().rem_euclid(bar);

        (0..CANDLE_COUNT)
            .rev()
            .map(|back| {
                let open_secs = end_secs - (back as i64 + 1) * bar;
                let open = self.price_at(symbol, open_secs);
                let close = self.price_at(symbol, open_secs + bar);
                let mid = self.price_at(symbol, open_secs + bar / 2);
                let high = open.max(close).max(mid) * 1.002;
                let low = open.min(close).min(mid) * 0.998;
                let date = Utc
                    .timestamp_opt(open_secs, 0)
                    .single()
                    .unwrap_or(end)
                    .format(DATE_FORMAT)
                    .to_string();
                Candle::new(
                    date,
                    round_cents(open),
                    round_cents(high),
                    round_cents(low),
                    round_cents(close),
                )
            })
            .collect()
    }

    /// Daily closes used for signals and backtests
    pub fn daily_closes(&self, symbol: &str, days: usize, end: DateTime<Utc>) -> Vec<f64> {
        self.closes(symbol, days, Duration::days(1).num_seconds(), end)
    }
}

fn symbol_seed(symbol: &str) -> u64 {
    symbol
        .to_uppercase()
        .bytes()
        .fold(17u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
}
