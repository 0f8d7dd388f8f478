use serde::{Deserialize, Serialize};

/// Answer of `GET /signal/{ticker}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub ticker: String,
    /// Model decision, usually `BUY`, `SELL` or `HOLD`
    pub signal: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub recommended_entry: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Signal {
    pub fn matches_ticker(&self, ticker: &str) -> bool {
        self.ticker.eq_ignore_ascii_case(ticker)
    }
}

/// Answer of `GET /metrics/{ticker}`.
///
/// Older backends report `"Final Cash"` instead of `"Final Value"`; both land
/// in `final_value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(rename = "Final Value", alias = "Final Cash", default)]
    pub final_value: Option<f64>,
    #[serde(rename = "Total PnL", default)]
    pub total_pnl: Option<f64>,
    #[serde(rename = "Win Rate", default)]
    pub win_rate: Option<f64>,
    #[serde(rename = "Num Trades", default)]
    pub num_trades: Option<u64>,
    #[serde(
        rename = "Sharpe Ratio",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sharpe_ratio: Option<f64>,
}
