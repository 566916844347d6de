//! Surveillance dashboard: polls the analytics endpoint and derives the
//! outbreak view (stat cards, map markers, chart bars, alert feed).
//!
//! Read-only; runs independently of the capture workflow.

pub mod aggregates;
pub mod poller;
pub mod source;
pub mod store;

pub use aggregates::{
    alert_feed, chart_bars, map_markers, ChartBar, DashboardSnapshot, DashboardStats, MapMarker,
    MarkerColor,
};
pub use poller::{DashboardPoller, PollerHandle};
pub use source::{AnalyticsSource, DashboardError, HttpAnalyticsSource, MockAnalyticsSource};
pub use store::{DashboardStore, RefreshOutcome};
