//! Simulation clock driving the periodic tick.
//!
//! The clock has two states. It is [`ClockState::Idle`] from construction
//! until [`SimulationClock::run`] is entered, and [`ClockState::Running`]
//! from then on; there is no way back. Each tick locks the store,
//! advances every track, and hands the snapshot to the broadcaster
//! before releasing the lock.
//!
//! # Shutdown
//!
//! Shutdown is observed only between ticks. Once a tick holds the store
//! lock it runs to completion without another await point, so neither a
//! shutdown signal nor aborting the task can publish half a tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::SimulationSettings;
use crate::publish::{BroadcastReport, Broadcaster};
use crate::store::SharedTrackStore;

/// Errors that can occur when building a clock.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Invalid timing configuration.
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Lifecycle state of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Constructed, no tick has been scheduled.
    Idle,
    /// Periodic ticking is active.
    Running,
}

/// Totals reported when the clock stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockSummary {
    /// Ticks executed by this clock.
    pub ticks: u64,
    /// Ticks whose broadcast had at least one failed delivery.
    pub degraded_ticks: u64,
}

/// Fixed-period driver of `advance_all` + `publish_all`.
pub struct SimulationClock {
    store: SharedTrackStore,
    broadcaster: Arc<dyn Broadcaster>,
    period: Duration,
    state: ClockState,
}

impl SimulationClock {
    /// Create an idle clock.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `period` is zero.
    pub fn new(
        store: SharedTrackStore,
        broadcaster: Arc<dyn Broadcaster>,
        period: Duration,
    ) -> Result<Self, ClockError> {
        if period.is_zero() {
            return Err(ClockError::InvalidConfig {
                reason: "tick period must be greater than zero".to_owned(),
            });
        }
        Ok(Self {
            store,
            broadcaster,
            period,
            state: ClockState::Idle,
        })
    }

    /// Create an idle clock using `simulation.tick_interval_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the interval is zero.
    pub fn from_settings(
        store: SharedTrackStore,
        broadcaster: Arc<dyn Broadcaster>,
        settings: &SimulationSettings,
    ) -> Result<Self, ClockError> {
        Self::new(
            store,
            broadcaster,
            Duration::from_millis(settings.tick_interval_ms),
        )
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> ClockState {
        self.state
    }

    /// Configured tick period.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Execute exactly one tick: advance all tracks, then broadcast.
    pub async fn tick_once(&self) -> BroadcastReport {
        let mut store = self.store.lock().await;
        let snapshot = store.advance_all();
        let report = self.broadcaster.publish_all(&snapshot);
        drop(store);

        if report.failed > 0 {
            warn!(
                tick = snapshot.tick,
                delivered = report.delivered,
                failed = report.failed,
                "Tick broadcast had failed deliveries"
            );
        } else {
            debug!(
                tick = snapshot.tick,
                tracks = snapshot.len(),
                delivered = report.delivered,
                "Tick broadcast sent"
            );
        }
        report
    }

    /// Tick every period until `shutdown` becomes `true` or its sender
    /// is dropped.
    ///
    /// The first tick fires immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ClockSummary {
        self.state = ClockState::Running;
        let mut summary = ClockSummary::default();

        info!(period_ms = self.period.as_millis(), "Simulation clock running");

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let stop = *shutdown.borrow();
            if stop {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let report = self.tick_once().await;
                    summary.ticks = summary.ticks.saturating_add(1);
                    if report.failed > 0 {
                        summary.degraded_ticks = summary.degraded_ticks.saturating_add(1);
                    }
                }
            }
        }

        info!(
            ticks = summary.ticks,
            degraded_ticks = summary.degraded_ticks,
            "Simulation clock stopped"
        );
        summary
    }

    /// Run the clock on a background task.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<ClockSummary> {
        tokio::spawn(self.run(shutdown))
    }
}
