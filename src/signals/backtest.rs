//! Single-pass long/short backtest over EMA crossover signals.

use super::ema::ema_series;
use super::engine::{SignalDirection, FAST_PERIOD, SLOW_PERIOD};
use crate::models::Metrics;

pub const INITIAL_CASH: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub final_value: f64,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
}

impl BacktestResult {
    pub fn to_metrics(&self, ticker: &str, initial_cash: f64) -> Metrics {
        Metrics {
            ticker: Some(ticker.to_string()),
            final_value: Some(self.final_value),
            total_pnl: Some(self.final_value - initial_cash),
            win_rate: Some(self.win_rate),
            num_trades: Some(self.total_trades),
            sharpe_ratio: Some(self.sharpe_ratio),
        }
    }
}

/// Per-bar signal: HOLD until both EMAs exist, then the side of the cross
pub fn crossover_signals(closes: &[f64]) -> Vec<SignalDirection> {
    let fast = ema_series(closes, FAST_PERIOD);
    let slow = ema_series(closes, SLOW_PERIOD);

    fast.iter()
        .zip(slow.iter())
        .map(|pair| match pair {
            (Some(f), Some(s)) if f > s => SignalDirection::Buy,
            (Some(f), Some(s)) if f < s => SignalDirection::Sell,
            _ => SignalDirection::Hold,
        })
        .collect()
}

enum Position {
    Flat,
    Long { units: f64, entry: f64 },
    Short { units: f64, entry: f64 },
}

/// Run the backtest; `None` when there are no closes
pub fn run_backtest(closes: &[f64], initial_cash: f64) -> Option<BacktestResult> {
    let last_close = *closes.last()?;
    let signals = crossover_signals(closes);

    let mut cash = initial_cash;
    let mut position = Position::Flat;
    let mut trades = 0u64;
    let mut winners = 0u64;
    let mut returns = Vec::new();

    for (&close, signal) in closes.iter().zip(signals) {
        if close <= 0.0 {
            continue;
        }
        position = match (position, signal) {
            (Position::Flat, SignalDirection::Buy) => {
                trades += 1;
                let units = cash / close;
                cash = 0.0;
                Position::Long { units, entry: close }
            }
            (Position::Flat, SignalDirection::Sell) => {
                trades += 1;
                let units = cash / close;
                cash = 0.0;
                Position::Short { units, entry: close }
            }
            (Position::Long { units, entry }, SignalDirection::Sell) => {
                cash = units * close;
                let trade_return = (close / entry - 1.0) * 100.0;
                if trade_return > 0.0 {
                    winners += 1;
                }
                returns.push(trade_return);
                Position::Flat
            }
            (Position::Short { units, entry }, SignalDirection::Buy) => {
                // Short P&L is booked on the entry/exit ratio; cash is notional.
                let trade_return = (entry / close - 1.0) * 100.0;
                cash = units * entry * (1.0 + trade_return / 100.0);
                if trade_return > 0.0 {
                    winners += 1;
                }
                returns.push(trade_return);
                Position::Flat
            }
            (unchanged, _) => unchanged,
        };
    }

    let final_value = match position {
        Position::Flat => cash,
        Position::Long { units, .. } => units * last_close,
        Position::Short { units, entry } => units * entry * (entry / last_close),
    };

    let win_rate = if trades > 0 {
        winners as f64 / trades as f64 * 100.0
    } else {
        0.0
    };

    Some(BacktestResult {
        final_value,
        total_trades: trades,
        winning_trades: winners,
        win_rate,
        sharpe_ratio: sharpe_ratio(&returns),
    })
}

/// Per-trade Sharpe ratio, 0 with fewer than two closed trades
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    mean / (variance.sqrt() + 1e-9) * n.sqrt()
}
