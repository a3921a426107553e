//! Fixed-interval refresh loop.
//!
//! No backoff: a failed cycle simply waits for the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;
use crate::refresh::cycle::Refresher;
use crate::settings::ScheduleSettings;

/// Floor for overridden intervals; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Classified result of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    Unchanged,
    Failed(&'static str),
}

pub struct RefreshScheduler {
    refresher: Arc<Refresher>,
    interval: Duration,
    run_on_start: bool,
}

impl RefreshScheduler {
    pub fn new(refresher: Arc<Refresher>, settings: &ScheduleSettings) -> Self {
        Self {
            refresher,
            interval: Duration::from_secs(settings.interval_secs.max(1)),
            run_on_start: settings.run_on_start,
        }
    }

    /// Override the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            run_on_start = self.run_on_start,
            "Config refresher starting"
        );

        let start = if self.run_on_start {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Config refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one cycle and log/record its outcome.
    pub async fn tick(&self) -> RefreshOutcome {
        let outcome = match self.refresher.refresh().await {
            Ok(_) => RefreshOutcome::Updated,
            Err(e) if e.is_unchanged() => {
                tracing::debug!("Configuration unchanged");
                RefreshOutcome::Unchanged
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Config refresh failed, keeping current configuration");
                RefreshOutcome::Failed(e.kind())
            }
        };

        metrics::record_refresh_outcome(match outcome {
            RefreshOutcome::Updated => "updated",
            RefreshOutcome::Unchanged => "unchanged",
            RefreshOutcome::Failed(kind) => kind,
        });
        outcome
    }
}
