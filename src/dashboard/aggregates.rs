//! Dashboard aggregates: pure functions over a fetched case list.
//!
//! Everything here is recomputed from scratch on every poll; there is no
//! incremental state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ALERT_FEED_LIMIT;
use crate::models::{CaseRecord, GeoPoint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub bacterial: usize,
    pub viral: usize,
    pub critical: usize,
}

impl DashboardStats {
    pub fn from_cases(cases: &[CaseRecord]) -> Self {
        cases.iter().fold(
            Self {
                total: cases.len(),
                ..Self::default()
            },
            |mut stats, case| {
                if case.is_bacterial() {
                    stats.bacterial += 1;
                }
                if case.is_viral() {
                    stats.viral += 1;
                }
                if case.is_critical() {
                    stats.critical += 1;
                }
                stats
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Red,
    Blue,
}

impl MarkerColor {
    pub fn color_hex(self) -> &'static str {
        match self {
            MarkerColor::Red => "#EF4444",
            MarkerColor::Blue => "#3B82F6",
        }
    }
}

/// One geolocated case on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub case_id: i64,
    pub position: GeoPoint,
    pub color: MarkerColor,
    pub village: Option<String>,
    pub diagnosis: Option<String>,
    pub temperature: Option<String>,
    pub has_phlegm: Option<String>,
    pub breathing_difficulty: Option<String>,
}

/// Markers for cases with both coordinates; red when bacterial.
pub fn map_markers(cases: &[CaseRecord]) -> Vec<MapMarker> {
    cases
        .iter()
        .filter_map(|case| {
            let position = case.location()?;
            Some(MapMarker {
                case_id: case.id,
                position,
                color: if case.is_bacterial() {
                    MarkerColor::Red
                } else {
                    MarkerColor::Blue
                },
                village: case.village_name.clone(),
                diagnosis: case.cough_diagnosis.clone(),
                temperature: case.temperature.clone(),
                has_phlegm: case.has_phlegm.clone(),
                breathing_difficulty: case.breathing_difficulty.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub count: usize,
    pub color_hex: &'static str,
}

/// Viral, Bacterial, Critical, in that order.
pub fn chart_bars(stats: &DashboardStats) -> Vec<ChartBar> {
    vec![
        ChartBar {
            label: "Viral (Safe)",
            count: stats.viral,
            color_hex: "#3B82F6",
        },
        ChartBar {
            label: "Bacterial (Meds)",
            count: stats.bacterial,
            color_hex: "#EF4444",
        },
        ChartBar {
            label: "Critical (ICU)",
            count: stats.critical,
            color_hex: "#7F1D1D",
        },
    ]
}

/// High-risk cases in fetch order, capped.
pub fn alert_feed(cases: &[CaseRecord]) -> Vec<CaseRecord> {
    cases
        .iter()
        .filter(|case| case.is_high_risk())
        .take(ALERT_FEED_LIMIT)
        .cloned()
        .collect()
}

/// Everything the dashboard shows, derived from one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub cases: Vec<CaseRecord>,
    pub stats: DashboardStats,
    pub markers: Vec<MapMarker>,
    pub chart: Vec<ChartBar>,
    pub alerts: Vec<CaseRecord>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn build(cases: Vec<CaseRecord>, fetched_at: DateTime<Utc>) -> Self {
        let stats = DashboardStats::from_cases(&cases);
        Self {
            markers: map_markers(&cases),
            chart: chart_bars(&stats),
            alerts: alert_feed(&cases),
            stats,
            cases,
            fetched_at: Some(fetched_at),
        }
    }

    /// Nothing fetched yet.
    pub fn empty() -> Self {
        let stats = DashboardStats::default();
        Self {
            cases: Vec::new(),
            chart: chart_bars(&stats),
            stats,
            markers: Vec::new(),
            alerts: Vec::new(),
            fetched_at: None,
        }
    }
}
