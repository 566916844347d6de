//! Background dashboard poller.
//!
//! Ticks every poll interval (first tick immediately) and refreshes the
//! store. The task belongs to its `PollerHandle`: `stop()` ends it cleanly,
//! dropping the handle aborts it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::source::AnalyticsSource;
use super::store::DashboardStore;

pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the loop and wait for it to exit.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Dashboard poller ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct DashboardPoller;

impl DashboardPoller {
    /// Spawn the poll loop on the current tokio runtime.
    pub fn start<A>(source: Arc<A>, store: Arc<DashboardStore>, interval: Duration) -> PollerHandle
    where
        A: AnalyticsSource + 'static,
    {
        let (shutdown, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Dashboard poller started");
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // Stop wins over a ready tick and cancels a fetch in flight.
            loop {
                tokio::select! {
                    biased;
                    _ = stop_requested(&mut stop_rx) => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = stop_requested(&mut stop_rx) => break,
                    _ = store.refresh(source.as_ref()) => {}
                }
            }
            tracing::info!("Dashboard poller stopped");
        });

        PollerHandle {
            shutdown,
            task: Some(task),
        }
    }
}

/// Resolves once stop is signalled or the handle is gone.
async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stop| *stop).await;
}
