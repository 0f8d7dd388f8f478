//! Signal and backtest analytics served by the dev backend.

pub mod backtest;
pub mod ema;
pub mod engine;

pub use backtest::{run_backtest, BacktestResult, INITIAL_CASH};
pub use engine::{SignalDirection, SignalEngine, MIN_CLOSES};
