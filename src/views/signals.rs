//! Signals page: on-demand signal and backtest metrics for one ticker.
//!
//! The two fetches are independent: each has its own loading flag, error and
//! request id, so both can be in flight at once. While metrics load, a
//! cosmetic progress percentage climbs on a timer; it has no relation to
//! server-side progress.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::core::scheduler::IntervalScheduler;
use crate::core::sequence::RequestSequence;
use crate::models::{Metrics, Signal};
use crate::services::backend::{ApiResult, DashboardApi};

pub const SIGNAL_ERROR: &str = "Error fetching signal. Check API or symbol.";
pub const METRICS_ERROR: &str = "Error fetching metrics. Check API.";
pub const EMPTY_TICKER_ERROR: &str = "Enter a stock symbol.";

pub const PROGRESS_STEP: u8 = 3;
pub const PROGRESS_CAP: u8 = 95;
pub const PROGRESS_DONE: u8 = 100;

/// Next simulated progress value, never above [`PROGRESS_CAP`]
pub fn next_progress(current: u8) -> u8 {
    if current >= PROGRESS_CAP {
        current
    } else {
        current.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalsState {
    pub ticker: String,

    pub signal: Option<Signal>,
    pub signal_error: Option<String>,
    pub loading_signal: bool,
    pub signal_request: u64,

    pub metrics: Option<Metrics>,
    /// Ticker the metrics were requested for
    pub metrics_ticker: Option<String>,
    pub metrics_error: Option<String>,
    pub loading_metrics: bool,
    pub metrics_request: u64,
    pub progress: u8,
}

impl SignalsState {
    pub fn apply_signal(&mut self, request_id: u64, ticker: &str, result: ApiResult<Signal>) -> bool {
        if request_id != self.signal_request {
            debug!(request_id, current = self.signal_request, "Signals: dropping superseded signal");
            return false;
        }

        self.loading_signal = false;
        match result {
            Ok(signal) if signal.matches_ticker(ticker) => {
                self.signal = Some(signal);
                self.signal_error = None;
            }
            Ok(signal) => {
                warn!(requested = %ticker, received = %signal.ticker, "Signals: signal for another ticker");
                self.signal = None;
                self.signal_error = Some(SIGNAL_ERROR.to_string());
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Signals: signal fetch failed");
                self.signal = None;
                self.signal_error = Some(SIGNAL_ERROR.to_string());
            }
        }
        true
    }

    /// One progress tick for `request_id`; no-op once the request resolved
    pub fn advance_progress(&mut self, request_id: u64) -> bool {
        if request_id != self.metrics_request || !self.loading_metrics {
            return false;
        }
        let next = next_progress(self.progress);
        if next == self.progress {
            return false;
        }
        self.progress = next;
        true
    }

    pub fn finish_metrics(&mut self, request_id: u64, result: ApiResult<Metrics>) -> bool {
        if request_id != self.metrics_request {
            debug!(request_id, current = self.metrics_request, "Signals: dropping superseded metrics");
            return false;
        }

        self.loading_metrics = false;
        self.progress = PROGRESS_DONE;
        match result {
            Ok(metrics) => {
                self.metrics = Some(metrics);
                self.metrics_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Signals: metrics fetch failed");
                self.metrics = None;
                self.metrics_error = Some(METRICS_ERROR.to_string());
            }
        }
        true
    }
}

pub struct SignalsView {
    api: Arc<dyn DashboardApi>,
    store: Arc<watch::Sender<SignalsState>>,
    sequence: RequestSequence,
    progress_interval: Duration,
    signal_task: Option<JoinHandle<()>>,
    metrics_task: Option<JoinHandle<()>>,
}

impl SignalsView {
    pub fn mount(
        api: Arc<dyn DashboardApi>,
        progress_interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if progress_interval.is_zero() {
            return Err("Signals: progress interval must be greater than 0".into());
        }
        let (store, _) = watch::channel(SignalsState::default());
        Ok(Self {
            api,
            store: Arc::new(store),
            sequence: RequestSequence::new(),
            progress_interval,
            signal_task: None,
            metrics_task: None,
        })
    }

    pub fn snapshot(&self) -> SignalsState {
        self.store.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SignalsState> {
        self.store.subscribe()
    }

    pub fn ticker(&self) -> String {
        self.store.borrow().ticker.clone()
    }

    /// Update the ticker input; symbols are upper-cased as typed
    pub fn set_ticker(&mut self, raw: &str) {
        let ticker = raw.trim().to_uppercase();
        self.store.send_modify(|state| state.ticker = ticker);
    }

    /// Fetch the signal for the current ticker; returns whether a request was issued
    pub fn fetch_signal(&mut self) -> bool {
        let ticker = self.ticker();
        if ticker.is_empty() {
            self.store.send_modify(|state| {
                state.signal = None;
                state.signal_error = Some(EMPTY_TICKER_ERROR.to_string());
            });
            return false;
        }

        let request_id = self.sequence.issue();
        if let Some(previous) = self.signal_task.take() {
            previous.abort();
        }
        self.store.send_modify(|state| {
            state.signal = None;
            state.signal_error = None;
            state.loading_signal = true;
            state.signal_request = request_id;
        });

        debug!(ticker = %ticker, request_id, "Signals: fetching signal");
        let api = self.api.clone();
        let store = self.store.clone();
        self.signal_task = Some(tokio::spawn(async move {
            let result = api.signal(&ticker).await;
            store.send_if_modified(|state| state.apply_signal(request_id, &ticker, result));
        }));
        true
    }

    /// Fetch backtest metrics for the current ticker; returns whether a request was issued
    pub fn fetch_metrics(&mut self) -> bool {
        let ticker = self.ticker();
        if ticker.is_empty() {
            self.store.send_modify(|state| {
                state.metrics = None;
                state.metrics_error = Some(EMPTY_TICKER_ERROR.to_string());
            });
            return false;
        }

        let request_id = self.sequence.issue();
        if let Some(previous) = self.metrics_task.take() {
            previous.abort();
        }
        self.store.send_modify(|state| {
            state.metrics = None;
            state.metrics_error = None;
            state.metrics_ticker = Some(ticker.clone());
            state.loading_metrics = true;
            state.progress = 0;
            state.metrics_request = request_id;
        });

        // The ticker lives inside the fetch task, so aborting the task (on
        // supersede or teardown) also stops the progress timer.
        let progress = match IntervalScheduler::new("metrics-progress", self.progress_interval) {
            Ok(progress) => {
                let tick_store = self.store.clone();
                progress.start(move || {
                    let store = tick_store.clone();
                    async move {
                        store.send_if_modified(|state| state.advance_progress(request_id));
                    }
                });
                Some(progress)
            }
            Err(e) => {
                error!(error = %e, "Signals: progress timer unavailable");
                None
            }
        };

        debug!(ticker = %ticker, request_id, "Signals: fetching metrics");
        let api = self.api.clone();
        let store = self.store.clone();
        self.metrics_task = Some(tokio::spawn(async move {
            let result = api.metrics(&ticker).await;
            drop(progress);
            store.send_if_modified(|state| state.finish_metrics(request_id, result));
        }));
        true
    }

    pub fn is_busy(&self) -> bool {
        let state = self.store.borrow();
        state.loading_signal || state.loading_metrics
    }
}

impl Drop for SignalsView {
    fn drop(&mut self) {
        if let Some(task) = self.signal_task.take() {
            task.abort();
        }
        if let Some(task) = self.metrics_task.take() {
            task.abort();
        }
    }
}
