//! Unit tests for the EMA crossover signal engine

use stocksignal::signals::engine::{SignalDirection, SignalEngine, EXPLANATION, MIN_CLOSES};

fn series(count: usize, start: f64, step: f64) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

#[test]
fn test_needs_minimum_closes() {
    let closes = series(MIN_CLOSES - 1, 100.0, 1.0);
    assert!(SignalEngine::direction(&closes).is_none());
    assert!(SignalEngine::evaluate("AAPL", &closes).is_none());
}

#[test]
fn test_uptrend_is_buy() {
    let closes = series(MIN_CLOSES, 100.0, 1.0);
    assert_eq!(SignalEngine::direction(&closes), Some(SignalDirection::Buy));
}

#[test]
fn test_downtrend_is_sell() {
    let closes = series(80, 200.0, -1.0);
    assert_eq!(SignalEngine::direction(&closes), Some(SignalDirection::Sell));
}

#[test]
fn test_only_recent_window_counts() {
    // Long decline followed by a 50-bar rally: only the rally is evaluated.
    let mut closes = series(200, 400.0, -1.0);
    closes.extend(series(MIN_CLOSES, 200.0, 1.0));
    assert_eq!(SignalEngine::direction(&closes), Some(SignalDirection::Buy));
}

#[test]
fn test_flat_is_hold() {
    let closes = vec![42.0; MIN_CLOSES];
    assert_eq!(SignalEngine::direction(&closes), Some(SignalDirection::Hold));
    assert_eq!(SignalDirection::Hold.to_string(), "HOLD");
}

#[test]
fn test_levels_derive_from_last_close() {
    let mut closes = series(MIN_CLOSES - 1, 50.0, 1.0);
    closes.push(200.0);
    let signal = SignalEngine::evaluate("MSFT", &closes).unwrap();

    assert_eq!(signal.ticker, "MSFT");
    assert_eq!(signal.signal, "BUY");
    assert_eq!(signal.current_price, Some(200.0));
    assert_eq!(signal.recommended_entry, Some(196.0));
    assert_eq!(signal.stop_loss, Some(190.0));
    assert_eq!(signal.take_profit, Some(210.0));
    assert_eq!(signal.explanation.as_deref(), Some(EXPLANATION));
}

#[test]
fn test_levels_are_rounded_to_cents() {
    let mut closes = vec![10.0; MIN_CLOSES - 1];
    closes.push(10.123);
    let signal = SignalEngine::evaluate("TSLA", &closes).unwrap();
    assert_eq!(signal.current_price, Some(10.12));
    assert_eq!(signal.recommended_entry, Some(9.92));
    assert_eq!(signal.stop_loss, Some(9.62));
    assert_eq!(signal.take_profit, Some(10.63));
}
