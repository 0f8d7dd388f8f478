//! Unit tests for the candle chart view

use std::sync::Arc;
use std::time::Duration;
use stocksignal::models::Timeframe;
use stocksignal::views::chart::{ChartView, CHART_ERROR};
use tokio::time::sleep;

use crate::fake_api::{candles, transport_error, FakeApi};

#[tokio::test(start_paused = true)]
async fn test_mount_fetches_daily_candles() {
    let api = Arc::new(FakeApi::new());
    let chart = ChartView::mount(api.clone(), "AAPL");
    assert!(chart.snapshot().loading);

    sleep(Duration::from_millis(10)).await;
    let state = chart.snapshot();
    assert!(!state.loading);
    assert_eq!(state.points.len(), 3);
    assert_eq!(state.data_timeframe, Some(Timeframe::OneDay));
    assert_eq!(api.calls(), vec!["candlestick/AAPL?timeframe=1d".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_switching_timeframe_refetches_and_keys_data() {
    let api = Arc::new(FakeApi::new());
    let mut chart = ChartView::mount(api.clone(), "AAPL");
    sleep(Duration::from_millis(10)).await;

    assert!(chart.set_timeframe(Timeframe::OneMinute));
    assert!(chart.snapshot().points.is_empty());
    sleep(Duration::from_millis(10)).await;

    let state = chart.snapshot();
    assert_eq!(state.timeframe, Timeframe::OneMinute);
    assert_eq!(state.data_timeframe, Some(Timeframe::OneMinute));
    assert!(api
        .calls()
        .contains(&"candlestick/AAPL?timeframe=1min".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_same_timeframe_does_not_refetch() {
    let api = Arc::new(FakeApi::new());
    let mut chart = ChartView::mount(api.clone(), "AAPL");
    sleep(Duration::from_millis(10)).await;

    assert!(!chart.set_timeframe(Timeframe::OneDay));
    assert!(!chart.set_symbol("aapl"));
    assert_eq!(api.count("candlestick"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_latest_request_wins() {
    let api = Arc::new(FakeApi::new());
    api.push_candles(Duration::from_secs(2), Ok(candles(5, 10.0)));
    api.push_candles(Duration::from_millis(100), Ok(candles(2, 20.0)));

    let mut chart = ChartView::mount(api.clone(), "AAPL");
    chart.set_timeframe(Timeframe::FiveMinutes);

    sleep(Duration::from_secs(3)).await;
    let state = chart.snapshot();
    assert_eq!(state.points.len(), 2);
    assert_eq!(state.data_timeframe, Some(Timeframe::FiveMinutes));
    assert_eq!(state.request_id, 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_sets_error_and_clears_points() {
    let api = Arc::new(FakeApi::new());
    api.push_candles(Duration::ZERO, Ok(candles(4, 50.0)));
    api.push_candles(Duration::ZERO, Err(transport_error()));

    let mut chart = ChartView::mount(api.clone(), "AAPL");
    sleep(Duration::from_millis(10)).await;
    assert_eq!(chart.snapshot().points.len(), 4);

    chart.refresh();
    sleep(Duration::from_millis(10)).await;
    let state = chart.snapshot();
    assert_eq!(state.error.as_deref(), Some(CHART_ERROR));
    assert!(state.points.is_empty());
    assert!(state.data_timeframe.is_none());
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_timeframe_is_sent_verbatim() {
    let api = Arc::new(FakeApi::new());
    let mut chart = ChartView::mount(api.clone(), "TSLA");
    chart.set_timeframe(Timeframe::parse("15min"));
    sleep(Duration::from_millis(10)).await;

    assert!(api
        .calls()
        .contains(&"candlestick/TSLA?timeframe=15min".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_symbol_change_refetches() {
    let api = Arc::new(FakeApi::new());
    let mut chart = ChartView::mount(api.clone(), "AAPL");
    assert!(chart.set_symbol(" msft "));
    sleep(Duration::from_millis(10)).await;

    assert_eq!(chart.symbol(), "MSFT");
    assert!(api
        .calls()
        .contains(&"candlestick/MSFT?timeframe=1d".to_string()));
}
