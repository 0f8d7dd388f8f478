//! Signal evaluation behind the dev backend's `/signal/{ticker}`.

use std::fmt;

use super::ema::check_ema_cross;
use crate::models::Signal;
use crate::services::synthetic::round_cents;

/// Closes needed before a signal is produced
pub const MIN_CLOSES: usize = 50;
pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;

pub const ENTRY_FACTOR: f64 = 0.98;
pub const STOP_LOSS_FACTOR: f64 = 0.95;
pub const TAKE_PROFIT_FACTOR: f64 = 1.05;

pub const EXPLANATION: &str = "Generated using EMA 12/26 crossover on the last 50 closes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "BUY",
            SignalDirection::Sell => "SELL",
            SignalDirection::Hold => "HOLD",
        }
    }

    pub fn from_cross(cross: i32) -> Self {
        match cross.signum() {
            1 => SignalDirection::Buy,
            -1 => SignalDirection::Sell,
            _ => SignalDirection::Hold,
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct SignalEngine;

impl SignalEngine {
    /// Direction from the most recent [`MIN_CLOSES`] closes
    pub fn direction(closes: &[f64]) -> Option<SignalDirection> {
        if closes.len() < MIN_CLOSES {
            return None;
        }
        let window = &closes[closes.len() - MIN_CLOSES..];
        check_ema_cross(window, FAST_PERIOD, SLOW_PERIOD).map(SignalDirection::from_cross)
    }

    /// Full signal with entry, stop and target derived from the last close
    pub fn evaluate(ticker: &str, closes: &[f64]) -> Option<Signal> {
        let direction = Self::direction(closes)?;
        let latest = *closes.last()?;

        Some(Signal {
            ticker: ticker.to_string(),
            signal: direction.as_str().to_string(),
            current_price: Some(round_cents(latest)),
            recommended_entry: Some(round_cents(latest * ENTRY_FACTOR)),
            stop_loss: Some(round_cents(latest * STOP_LOSS_FACTOR)),
            take_profit: Some(round_cents(latest * TAKE_PROFIT_FACTOR)),
            explanation: Some(EXPLANATION.to_string()),
        })
    }
}
