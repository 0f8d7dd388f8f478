//! Fixed-interval scheduler driving the market poll and the metrics progress
//! ticker

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Runs a tick future every `period` until stopped or dropped.
///
/// Each tick runs as its own task so a slow tick never delays the next one.
/// Stopping aborts the loop together with every tick still in flight.
pub struct IntervalScheduler {
    name: &'static str,
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `name` - Label used in logs
    /// * `period` - Time between ticks (zero = disabled)
    pub fn new(
        name: &'static str,
        period: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if period.is_zero() {
            return Err(format!("Scheduler {} disabled: period is 0", name).into());
        }

        debug!(
            scheduler = name,
            period_ms = period.as_millis() as u64,
            "IntervalScheduler: created"
        );

        Ok(Self {
            name,
            period,
            handle: Mutex::new(None),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking; the first tick fires after one period
    pub fn start<F, Fut>(&self, tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn_loop(Instant::now() + self.period, tick);
    }

    /// Start ticking; the first tick fires immediately
    pub fn start_immediate<F, Fut>(&self, tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn_loop(Instant::now(), tick);
    }

    fn spawn_loop<F, Fut>(&self, first: Instant, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = self.name;
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        debug!(scheduler = name, in_flight = in_flight.len(), "IntervalScheduler: tick");
                        in_flight.spawn(tick());
                    }
                    Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                        if let Err(e) = joined {
                            if e.is_panic() {
                                error!(scheduler = name, error = %e, "IntervalScheduler: tick panicked");
                            }
                        }
                    }
                }
            }
        });

        let mut slot = self.slot();
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
        info!(scheduler = name, "IntervalScheduler: started");
    }

    /// Stop the scheduler and abort in-flight ticks
    pub fn stop(&self) {
        if let Some(handle) = self.slot().take() {
            handle.abort();
            info!(scheduler = self.name, "IntervalScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.slot()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
