//! Scripted in-process backend for view and shell tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use stocksignal::models::{
    AuthMessage, Candle, Metrics, PriceQuote, Session, Signal, SignupRequest, Timeframe,
    UserIdentity,
};
use stocksignal::services::{ApiError, ApiResult, DashboardApi};

type Queue<T> = Mutex<VecDeque<(Duration, ApiResult<T>)>>;

/// Each endpoint answers from its queue first, then from a default.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    session: Queue<Session>,
    login: Queue<AuthMessage>,
    signup: Queue<AuthMessage>,
    logout: Queue<AuthMessage>,
    prices: Queue<Vec<PriceQuote>>,
    signals: Queue<Signal>,
    metrics: Queue<Metrics>,
    candles: Queue<Vec<Candle>>,
}

pub fn quote(symbol: &str, price: f64) -> PriceQuote {
    PriceQuote {
        symbol: symbol.to_string(),
        price: Some(price),
        prev_close: Some(price - 1.0),
        timestamp: Some("2024-01-02 15:59:00".to_string()),
    }
}

pub fn signal_for(ticker: &str) -> Signal {
    Signal {
        ticker: ticker.to_string(),
        signal: "BUY".to_string(),
        current_price: Some(100.0),
        recommended_entry: Some(98.0),
        stop_loss: Some(95.0),
        take_profit: Some(105.0),
        explanation: None,
    }
}

pub fn sample_metrics(ticker: &str) -> Metrics {
    Metrics {
        ticker: Some(ticker.to_string()),
        final_value: Some(104_250.0),
        total_pnl: Some(4_250.0),
        win_rate: Some(60.0),
        num_trades: Some(5),
        sharpe_ratio: Some(1.1),
    }
}

pub fn candles(count: usize, base: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = base + i as f64;
            Candle::new(
                format!("2024-01-{:02} 00:00:00", i + 1),
                close - 0.5,
                close + 1.0,
                close - 1.0,
                close,
            )
        })
        .collect()
}

pub fn transport_error() -> ApiError {
    ApiError::Transport("connection refused".to_string())
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls whose path starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn push_session(&self, delay: Duration, result: ApiResult<Session>) {
        self.session.lock().unwrap().push_back((delay, result));
    }

    pub fn push_login(&self, result: ApiResult<AuthMessage>) {
        self.login.lock().unwrap().push_back((Duration::ZERO, result));
    }

    pub fn push_signup(&self, result: ApiResult<AuthMessage>) {
        self.signup.lock().unwrap().push_back((Duration::ZERO, result));
    }

    pub fn push_logout(&self, result: ApiResult<AuthMessage>) {
        self.logout.lock().unwrap().push_back((Duration::ZERO, result));
    }

    pub fn push_prices(&self, delay: Duration, result: ApiResult<Vec<PriceQuote>>) {
        self.prices.lock().unwrap().push_back((delay, result));
    }

    pub fn push_signal(&self, delay: Duration, result: ApiResult<Signal>) {
        self.signals.lock().unwrap().push_back((delay, result));
    }

    pub fn push_metrics(&self, delay: Duration, result: ApiResult<Metrics>) {
        self.metrics.lock().unwrap().push_back((delay, result));
    }

    pub fn push_candles(&self, delay: Duration, result: ApiResult<Vec<Candle>>) {
        self.candles.lock().unwrap().push_back((delay, result));
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn answer<T>(&self, queue: &Queue<T>, default: impl FnOnce() -> ApiResult<T>) -> ApiResult<T> {
        let scripted = queue.lock().unwrap().pop_front();
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => default(),
        }
    }
}

fn message(text: &str) -> AuthMessage {
    AuthMessage {
        message: Some(text.to_string()),
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn login(&self, username: &str, _password: &str) -> ApiResult<AuthMessage> {
        self.record(format!("login/{}", username));
        self.answer(&self.login, || Ok(message("Login successful"))).await
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthMessage> {
        self.record(format!("signup/{}", request.username));
        self.answer(&self.signup, || Ok(message("User created successfully")))
            .await
    }

    async fn logout(&self) -> ApiResult<AuthMessage> {
        self.record("logout".to_string());
        self.answer(&self.logout, || Ok(message("Logged out"))).await
    }

    async fn check_login(&self) -> ApiResult<Session> {
        self.record("check_login".to_string());
        self.answer(&self.session, || Ok(Session::anonymous())).await
    }

    async fn get_user_id(&self) -> ApiResult<UserIdentity> {
        self.record("get_user_id".to_string());
        Ok(UserIdentity {
            user_id: Some(1),
            username: Some("alice".to_string()),
        })
    }

    async fn debug_session(&self) -> ApiResult<Value> {
        self.record("debug_session".to_string());
        Ok(json!({ "session": {} }))
    }

    async fn live_prices(&self) -> ApiResult<Vec<PriceQuote>> {
        self.record("live_prices".to_string());
        self.answer(&self.prices, || Ok(vec![quote("AAPL", 190.0)]))
            .await
    }

    async fn signal(&self, ticker: &str) -> ApiResult<Signal> {
        self.record(format!("signal/{}", ticker));
        self.answer(&self.signals, || Ok(signal_for(ticker))).await
    }

    async fn metrics(&self, ticker: &str) -> ApiResult<Metrics> {
        self.record(format!("metrics/{}", ticker));
        self.answer(&self.metrics, || Ok(sample_metrics(ticker))).await
    }

    async fn candlestick(&self, symbol: &str, timeframe: &Timeframe) -> ApiResult<Vec<Candle>> {
        self.record(format!("candlestick/{}?timeframe={}", symbol, timeframe));
        self.answer(&self.candles, || Ok(candles(3, 100.0))).await
    }
}
