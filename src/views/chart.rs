//! Candle chart for one symbol, refetched whenever symbol or timeframe change.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::sequence::RequestSequence;
use crate::models::{Candle, ChartPoint, Timeframe};
use crate::services::backend::{ApiResult, DashboardApi};

pub const CHART_ERROR: &str = "API Error. Try again later.";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub loading: bool,
    pub error: Option<String>,
    pub points: Vec<ChartPoint>,
    /// Timeframe the current `points` were fetched for
    pub data_timeframe: Option<Timeframe>,
    /// Id of the request whose answer this state is waiting for
    pub request_id: u64,
}

impl ChartState {
    fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
            loading: true,
            error: None,
            points: Vec::new(),
            data_timeframe: None,
            request_id: 0,
        }
    }

    /// Apply the answer of `request_id`; superseded answers are dropped
    pub fn apply(
        &mut self,
        request_id: u64,
        timeframe: &Timeframe,
        result: ApiResult<Vec<Candle>>,
    ) -> bool {
        if request_id != self.request_id {
            debug!(
                request_id,
                current = self.request_id,
                "Chart: dropping superseded candle response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(candles) => {
                self.points = candles.iter().map(ChartPoint::from).collect();
                self.data_timeframe = Some(timeframe.clone());
                self.error = None;
            }
            Err(e) => {
                warn!(symbol = %self.symbol, timeframe = %timeframe, error = %e, "Chart: candle fetch failed");
                self.points.clear();
                self.data_timeframe = None;
                self.error = Some(CHART_ERROR.to_string());
            }
        }
        true
    }
}

pub struct ChartView {
    api: Arc<dyn DashboardApi>,
    store: Arc<watch::Sender<ChartState>>,
    sequence: RequestSequence,
    in_flight: Option<JoinHandle<()>>,
}

impl ChartView {
    /// Mount with the default `1d` timeframe
    pub fn mount(api: Arc<dyn DashboardApi>, symbol: &str) -> Self {
        Self::mount_with(api, symbol, Timeframe::default())
    }

    pub fn mount_with(api: Arc<dyn DashboardApi>, symbol: &str, timeframe: Timeframe) -> Self {
        let (store, _) = watch::channel(ChartState::new(symbol, timeframe.clone()));
        let mut view = Self {
            api,
            store: Arc::new(store),
            sequence: RequestSequence::new(),
            in_flight: None,
        };
        view.fetch(symbol.to_string(), timeframe);
        view
    }

    pub fn symbol(&self) -> String {
        self.store.borrow().symbol.clone()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.store.borrow().timeframe.clone()
    }

    pub fn snapshot(&self) -> ChartState {
        self.store.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChartState> {
        self.store.subscribe()
    }

    /// Switch timeframe; returns whether a refetch was issued
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> bool {
        if self.store.borrow().timeframe == timeframe {
            return false;
        }
        let symbol = self.symbol();
        self.fetch(symbol, timeframe);
        true
    }

    /// Switch symbol; returns whether a refetch was issued
    pub fn set_symbol(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        if self.store.borrow().symbol == symbol {
            return false;
        }
        let timeframe = self.timeframe();
        self.fetch(symbol, timeframe);
        true
    }

    /// Fetch again for the current pair
    pub fn refresh(&mut self) {
        let (symbol, timeframe) = {
            let state = self.store.borrow();
            (state.symbol.clone(), state.timeframe.clone())
        };
        self.fetch(symbol, timeframe);
    }

    fn fetch(&mut self, symbol: String, timeframe: Timeframe) {
        let request_id = self.sequence.issue();
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        self.store.send_modify(|state| {
            state.symbol = symbol.clone();
            state.timeframe = timeframe.clone();
            state.loading = true;
            state.error = None;
            state.points.clear();
            state.data_timeframe = None;
            state.request_id = request_id;
        });

        debug!(symbol = %symbol, timeframe = %timeframe, request_id, "Chart: fetching candles");

        let api = self.api.clone();
        let store = self.store.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.candlestick(&symbol, &timeframe).await;
            store.send_if_modified(|state| state.apply(request_id, &timeframe, result));
        }));
    }
}

impl Drop for ChartView {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}
