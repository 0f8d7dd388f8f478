//! Text rendering of view state. Everything here is pure.

use super::chart::ChartState;
use super::forms::FormState;
use super::market::MarketState;
use super::shell::{AuthState, Route, Theme};
use super::signals::{SignalsState, PROGRESS_DONE};
use crate::models::{Metrics, PriceQuote, Signal};

pub const BRAND: &str = "Stock Signal Dashboard";
pub const LOADING: &str = "Loading...";

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const PROGRESS_WIDTH: usize = 20;

/// Append `text` and a newline
fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

pub fn loading_screen() -> String {
    format!("{}\n", LOADING)
}

/// `$1234.50`, or `N/A` when the backend sent no value
pub fn format_money(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${:.2}", v),
        _ => "N/A".to_string(),
    }
}

pub fn nav_bar(theme: Theme, auth: &AuthState, route: &Route) -> String {
    let links = if auth.is_authenticated() {
        [Route::Market, Route::Signals]
    } else {
        [Route::Login, Route::Signup]
    };
    let links = links
        .iter()
        .map(|link| {
            if link == route {
                format!("[{}]", link.path())
            } else {
                link.path().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let user = match auth {
        AuthState::Authenticated { username } => {
            format!("user: {}", username.as_deref().unwrap_or("unknown"))
        }
        _ => "not signed in".to_string(),
    };

    format!(
        "== {} == theme: {} ({}) | {} | {}",
        BRAND,
        theme.as_str(),
        theme.primary(),
        links,
        user
    )
}

pub fn price_card(quote: &PriceQuote) -> String {
    let mut card = format!("{:<6} {:>12}", quote.symbol, format_money(quote.price));
    if let Some(change) = quote.change_pct() {
        card.push_str(&format!(" ({:+.2}%)", change));
    }
    card.push_str(&format!("  prev close {}", format_money(quote.prev_close)));
    if let Some(ts) = &quote.timestamp {
        card.push_str(&format!("  at {}", ts));
    }
    card
}

pub fn market_screen(state: &MarketState, chart: Option<&ChartState>) -> String {
    let mut out = String::from("Live Market Prices\n");
    if state.is_loading() {
        out.push_str(LOADING);
        out.push('\n');
        return out;
    }

    if let Some(error) = &state.error {
        line(&mut out, format!("! {}", error));
    }
    for quote in &state.quotes {
        out.push_str(&price_card(quote));
        out.push('\n');
    }
    match state.last_updated {
        Some(at) => {
            line(&mut out, format!("Last updated: {}", at.format("%H:%M:%S")));
        }
        None => out.push_str("Last updated: never\n"),
    }

    if let Some(chart) = chart {
        out.push('\n');
        out.push_str(&chart_panel(chart));
    }
    out
}

/// One block character per value, scaled between the series min and max
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let idx = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

pub fn chart_panel(state: &ChartState) -> String {
    let mut out = format!(
        "{} - {} Candlestick Chart\n",
        state.symbol,
        state.timeframe.as_str()
    );
    if state.loading {
        line(&mut out, LOADING);
        return out;
    }
    if let Some(error) = &state.error {
        line(&mut out, format!("! {}", error));
        return out;
    }
    if state.points.is_empty() {
        out.push_str("No candles\n");
        return out;
    }

    let closes: Vec<f64> = state.points.iter().map(|p| p.close).collect();
    let high = state.points.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
    let low = state.points.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
    line(&mut out, sparkline(&closes));
    if let (Some(first), Some(last)) = (state.points.first(), state.points.last()) {
        line(&mut out, format!("{} .. {}", first.date, last.date));
        line(
            &mut out,
            format!(
                "high {}  low {}  close {}",
                format_money(Some(high)),
                format_money(Some(low)),
                format_money(Some(last.close))
            ),
        );
    }
    out
}

pub fn progress_bar(progress: u8) -> String {
    let pct = progress.min(PROGRESS_DONE) as usize;
    let filled = pct * PROGRESS_WIDTH / PROGRESS_DONE as usize;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled),
        pct
    )
}

pub fn signal_card(signal: &Signal) -> String {
    let mut out = format!("Signal for {}: {}\n", signal.ticker, signal.signal);
    line(&mut out, format!("  Current price:     {}", format_money(signal.current_price)));
    line(&mut out, format!("  Recommended entry: {}", format_money(signal.recommended_entry)));
    line(&mut out, format!("  Stop loss:         {}", format_money(signal.stop_loss)));
    line(&mut out, format!("  Take profit:       {}", format_money(signal.take_profit)));
    if let Some(explanation) = &signal.explanation {
        line(&mut out, format!("  {}", explanation));
    }
    out
}

pub fn metrics_card(metrics: &Metrics) -> String {
    let mut out = String::from("Backtest metrics\n");
    line(&mut out, format!("  Final value: {}", format_money(metrics.final_value)));
    match metrics.total_pnl {
        Some(pnl) => {
            let label = if pnl >= 0.0 { "gain" } else { "loss" };
            line(&mut out, format!("  Total PnL:   {} ({})", format_money(Some(pnl)), label));
        }
        None => out.push_str("  Total PnL:   N/A\n"),
    }
    match metrics.win_rate {
        Some(rate) => {
            line(&mut out, format!("  Win rate:    {:.2}%", rate));
        }
        None => out.push_str("  Win rate:    N/A\n"),
    }
    match metrics.num_trades {
        Some(n) => {
            line(&mut out, format!("  Trades:      {}", n));
        }
        None => out.push_str("  Trades:      N/A\n"),
    }
    if let Some(sharpe) = metrics.sharpe_ratio {
        line(&mut out, format!("  Sharpe:      {:.2}", sharpe));
    }
    out
}

pub fn signals_screen(state: &SignalsState) -> String {
    let ticker = if state.ticker.is_empty() {
        "(none)"
    } else {
        state.ticker.as_str()
    };
    let mut out = format!("Trading Signals\nTicker: {}\n\n", ticker);

    if state.loading_signal {
        line(&mut out, "Fetching signal...");
    } else if let Some(error) = &state.signal_error {
        line(&mut out, format!("! {}", error));
    } else if let Some(signal) = &state.signal {
        out.push_str(&signal_card(signal));
    }

    if state.loading_metrics {
        line(&mut out, format!("Running backtest {}", progress_bar(state.progress)));
    } else if let Some(error) = &state.metrics_error {
        line(&mut out, format!("! {}", error));
    } else if let Some(metrics) = &state.metrics {
        if let Some(ticker) = &state.metrics_ticker {
            line(&mut out, format!("{} {}", ticker, progress_bar(state.progress)));
        }
        out.push_str(&metrics_card(metrics));
    }
    out
}

fn form_footer(out: &mut String, state: &FormState) {
    if state.loading {
        out.push_str("Submitting...\n");
    }
    if let Some(error) = &state.error {
        line(out, format!("! {}", error));
    }
    if let Some(notice) = &state.notice {
        line(out, notice);
    }
}

pub fn login_screen(state: &FormState) -> String {
    let mut out = String::from("Login\n  login <username> <password>\n");
    form_footer(&mut out, state);
    out
}

pub fn signup_screen(state: &FormState) -> String {
    let mut out = String::from("Sign Up\n  signup <username> <email> <password> <confirm>\n");
    form_footer(&mut out, state);
    out
}
