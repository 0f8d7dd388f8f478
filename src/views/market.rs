//! Live market grid: polls `/live_prices` on a fixed period while mounted.

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::chart::{ChartState, ChartView};
use crate::core::scheduler::IntervalScheduler;
use crate::core::sequence::RequestSequence;
use crate::models::PriceQuote;
use crate::services::backend::{ApiResult, DashboardApi};

pub const NO_DATA_ERROR: &str = "No data available";
pub const FETCH_ERROR: &str = "Failed to fetch live prices. Check API connection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPhase {
    /// No poll has resolved yet
    Loading,
    /// Data (possibly stale after an error) is available
    Steady,
}

#[derive(Debug, Clone)]
pub struct MarketState {
    pub phase: MarketPhase,
    pub quotes: Vec<PriceQuote>,
    pub last_updated: Option<DateTime<Local>>,
    pub error: Option<String>,
    /// Id of the newest poll applied so far
    pub applied_request: u64,
    /// Number of poll results applied
    pub updates: u64,
}

impl Default for MarketState {
    fn default() -> Self {
        Self {
            phase: MarketPhase::Loading,
            quotes: Vec::new(),
            last_updated: None,
            error: None,
            applied_request: 0,
            updates: 0,
        }
    }
}

impl MarketState {
    pub fn is_loading(&self) -> bool {
        self.phase == MarketPhase::Loading
    }

    /// Apply the result of poll `request_id`.
    ///
    /// Results older than the last applied poll are dropped. A failed poll
    /// keeps the quotes already on screen.
    pub fn apply_poll(&mut self, request_id: u64, result: ApiResult<Vec<PriceQuote>>) -> bool {
        if request_id <= self.applied_request {
            debug!(
                request_id,
                applied = self.applied_request,
                "Market: dropping stale poll result"
            );
            return false;
        }

        self.applied_request = request_id;
        self.phase = MarketPhase::Steady;
        self.updates += 1;

        match result {
            Ok(quotes) if !quotes.is_empty() => {
                self.quotes = quotes;
                self.last_updated = Some(Local::now());
                self.error = None;
            }
            Ok(_) => {
                self.quotes.clear();
                self.error = Some(NO_DATA_ERROR.to_string());
            }
            Err(e) => {
                warn!(request_id, error = %e, "Market: live price poll failed");
                self.error = Some(FETCH_ERROR.to_string());
            }
        }
        true
    }
}

/// Market page. Polling starts on mount and stops when the view is dropped.
pub struct MarketView {
    api: Arc<dyn DashboardApi>,
    store: Arc<watch::Sender<MarketState>>,
    scheduler: IntervalScheduler,
    chart: Option<ChartView>,
}

impl MarketView {
    /// Mount the view: fetch immediately, then every `poll_interval`
    pub fn mount(
        api: Arc<dyn DashboardApi>,
        poll_interval: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = IntervalScheduler::new("market-poll", poll_interval)?;
        let (store, _) = watch::channel(MarketState::default());
        let store = Arc::new(store);
        let sequence = Arc::new(RequestSequence::new());

        let poll_api = api.clone();
        let poll_store = store.clone();
        scheduler.start_immediate(move || {
            let api = poll_api.clone();
            let store = poll_store.clone();
            let request_id = sequence.issue();
            async move {
                let result = api.live_prices().await;
                store.send_if_modified(|state| state.apply_poll(request_id, result));
            }
        });

        info!(
            period_ms = poll_interval.as_millis() as u64,
            "Market: mounted, polling live prices"
        );

        Ok(Self {
            api,
            store,
            scheduler,
            chart: None,
        })
    }

    pub fn snapshot(&self) -> MarketState {
        self.store.borrow().clone()
    }

    /// Receiver notified after every applied poll
    pub fn subscribe(&self) -> watch::Receiver<MarketState> {
        self.store.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Open the chart for `symbol`, replacing any other open chart
    pub fn select(&mut self, symbol: &str) -> &mut ChartView {
        let symbol = symbol.trim().to_uppercase();
        let reuse = matches!(&self.chart, Some(chart) if chart.symbol() == symbol);
        if !reuse {
            self.chart = Some(ChartView::mount(self.api.clone(), &symbol));
        }
        self.chart.as_mut().expect("chart present")
    }

    pub fn close_chart(&mut self) -> bool {
        self.chart.take().is_some()
    }

    pub fn chart(&self) -> Option<&ChartView> {
        self.chart.as_ref()
    }

    pub fn chart_mut(&mut self) -> Option<&mut ChartView> {
        self.chart.as_mut()
    }

    pub fn chart_snapshot(&self) -> Option<ChartState> {
        self.chart.as_ref().map(ChartView::snapshot)
    }

    /// Tear down: stops polling and drops the chart
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for MarketView {
    fn drop(&mut self) {
        self.scheduler.stop();
        debug!("Market: unmounted");
    }
}
