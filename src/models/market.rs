use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of `GET /live_prices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub prev_close: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl PriceQuote {
    /// Change against the previous close, in percent
    pub fn change_pct(&self) -> Option<f64> {
        match (self.price, self.prev_close) {
            (Some(price), Some(prev)) if prev != 0.0 => Some((price - prev) / prev * 100.0),
            _ => None,
        }
    }
}

/// One entry of `GET /candlestick/{symbol}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: String,
    /// `[open, high, low, close]`
    pub ohlc: [f64; 4],
}

impl Candle {
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date: date.into(),
            ohlc: [open, high, low, close],
        }
    }

    pub fn open(&self) -> f64 {
        self.ohlc[0]
    }

    pub fn high(&self) -> f64 {
        self.ohlc[1]
    }

    pub fn low(&self) -> f64 {
        self.ohlc[2]
    }

    pub fn close(&self) -> f64 {
        self.ohlc[3]
    }
}

/// A candle flattened for plotting
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Candle> for ChartPoint {
    fn from(candle: &Candle) -> Self {
        Self {
            date: candle.date.clone(),
            open: candle.open(),
            high: candle.high(),
            low: candle.low(),
            close: candle.close(),
        }
    }
}

/// Chart resolution.
///
/// Values outside the known set are kept verbatim and sent to the backend
/// unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timeframe {
    OneMinute,
    FiveMinutes,
    OneHour,
    OneDay,
    Other(String),
}

impl Timeframe {
    pub const KNOWN: [Timeframe; 4] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::OneHour,
        Timeframe::OneDay,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "1min" => Timeframe::OneMinute,
            "5min" => Timeframe::FiveMinutes,
            "1hr" => Timeframe::OneHour,
            "1d" => Timeframe::OneDay,
            other => Timeframe::Other(other.to_string()),
        }
    }

    /// Query-string value
    pub fn as_str(&self) -> &str {
        match self {
            Timeframe::OneMinute => "1min",
            Timeframe::FiveMinutes => "5min",
            Timeframe::OneHour => "1hr",
            Timeframe::OneDay => "1d",
            Timeframe::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Timeframe::OneMinute => "1 Min".to_string(),
            Timeframe::FiveMinutes => "5 Min".to_string(),
            Timeframe::OneHour => "1 Hour".to_string(),
            Timeframe::OneDay => "1 Day".to_string(),
            Timeframe::Other(raw) => raw.clone(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Timeframe::Other(_))
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::OneDay
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Timeframe {
    fn from(raw: &str) -> Self {
        Timeframe::parse(raw)
    }
}
