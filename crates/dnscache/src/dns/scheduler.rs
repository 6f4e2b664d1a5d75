//! Background refresh task and its lifecycle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::config::RefreshHook;
use super::resolver::Shared;
use crate::error::{DnsCacheError, Result};
use crate::logging::targets;

/// Lifecycle state of the background refresh task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
    /// Refreshing on every tick of the interval.
    Running,
    /// Refresh has been stopped. Terminal.
    Stopped,
}

impl std::fmt::Display for RefreshState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

enum SchedulerState {
    Running {
        /// Dropping the sender closes the channel, which ends the task.
        stop_tx: watch::Sender<()>,
        task: JoinHandle<()>,
    },
    Stopped,
}

/// Owns the refresh task of one resolver.
pub(crate) struct Scheduler {
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    /// Spawn the refresh task on the current tokio runtime.
    pub(crate) fn start(
        shared: Arc<Shared>,
        interval: Duration,
        on_refreshed: Option<RefreshHook>,
    ) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| DnsCacheError::Runtime(e.to_string()))?;

        let (stop_tx, stop_rx) = watch::channel(());
        let task = handle.spawn(run(shared, interval, on_refreshed, stop_rx));
        tracing::debug!(target: targets::REFRESH, ?interval, "refresh task started");

        Ok(Self {
            state: Mutex::new(SchedulerState::Running { stop_tx, task }),
        })
    }

    pub(crate) fn state(&self) -> RefreshState {
        match *self.state.lock() {
            SchedulerState::Running { .. } => RefreshState::Running,
            SchedulerState::Stopped => RefreshState::Stopped,
        }
    }

    /// Move to `Stopped`, returning the task handle on the first call only.
    pub(crate) fn stop(&self) -> Option<JoinHandle<()>> {
        let previous = std::mem::replace(&mut *self.state.lock(), SchedulerState::Stopped);
        match previous {
            SchedulerState::Running { stop_tx, task } => {
                drop(stop_tx);
                tracing::debug!(target: targets::REFRESH, "refresh task stopping");
                Some(task)
            }
            SchedulerState::Stopped => None,
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    shared: Arc<Shared>,
    interval: Duration,
    on_refreshed: Option<RefreshHook>,
    mut stop_rx: watch::Receiver<()>,
) {
    // The first cycle runs one full interval after start.
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    // A cycle longer than the interval skips ticks rather than overlapping.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            _ = shared.refresh_all() => {}
        }

        if let Some(hook) = &on_refreshed {
            hook();
        }
    }

    tracing::debug!(target: targets::REFRESH, "refresh task exited");
}
