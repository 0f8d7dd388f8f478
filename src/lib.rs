//! Terminal dashboard for live stock prices, trading signals and backtest
//! metrics served by a session-authenticated HTTP backend.

pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
pub mod views;
