use std::sync::{PoisonError, RwLock};

use chrono::Utc;

use super::aggregates::DashboardSnapshot;
use super::source::AnalyticsSource;

/// What a single refresh attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New snapshot stored.
    Updated { cases: usize },
    /// Previous fetch still running; nothing done.
    Skipped,
    /// Fetch failed; the previous snapshot is still served.
    Failed,
}

/// Latest dashboard snapshot plus the single-flight refresh guard.
pub struct DashboardStore {
    snapshot: RwLock<DashboardSnapshot>,
    refreshing: tokio::sync::Mutex<()>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(DashboardSnapshot::empty()),
            refreshing: tokio::sync::Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.try_lock().is_err()
    }

    /// Fetch once and replace the snapshot wholesale.
    pub async fn refresh<A: AnalyticsSource>(&self, source: &A) -> RefreshOutcome {
        let Ok(_guard) = self.refreshing.try_lock() else {
            tracing::debug!("Dashboard refresh skipped: previous fetch still running");
            return RefreshOutcome::Skipped;
        };

        match source.fetch_cases().await {
            Ok(cases) => {
                let count = cases.len();
                let snapshot = DashboardSnapshot::build(cases, Utc::now());
                tracing::debug!(
                    cases = count,
                    bacterial = snapshot.stats.bacterial,
                    critical = snapshot.stats.critical,
                    "Dashboard refreshed"
                );
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = snapshot;
                RefreshOutcome::Updated { cases: count }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard fetch failed; keeping previous data");
                RefreshOutcome::Failed
            }
        }
    }
}
