use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::models::CaseRecord;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Cannot connect to analytics endpoint at {0}")]
    Connection(String),

    #[error("Analytics request timed out")]
    Timeout,

    #[error("Analytics endpoint returned {status}")]
    Status { status: u16 },

    #[error("Malformed analytics payload: {0}")]
    Malformed(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Anything that can produce the current case list.
pub trait AnalyticsSource: Send + Sync {
    fn fetch_cases(&self) -> impl Future<Output = Result<Vec<CaseRecord>, DashboardError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// HttpAnalyticsSource
// ═══════════════════════════════════════════════════════════

pub struct HttpAnalyticsSource {
    analytics_url: String,
    client: reqwest::Client,
}

impl HttpAnalyticsSource {
    /// The request timeout is bounded by the poll interval so a slow
    /// backend cannot stack up fetches.
    pub fn new(analytics_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::HttpClient(e.to_string()))?;

        Ok(Self {
            analytics_url: analytics_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn analytics_url(&self) -> &str {
        &self.analytics_url
    }
}

impl AnalyticsSource for HttpAnalyticsSource {
    fn fetch_cases(&self) -> impl Future<Output = Result<Vec<CaseRecord>, DashboardError>> + Send {
        async move {
            let response = self
                .client
                .get(&self.analytics_url)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        DashboardError::Timeout
                    } else if e.is_connect() {
                        DashboardError::Connection(self.analytics_url.clone())
                    } else {
                        DashboardError::HttpClient(e.to_string())
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(DashboardError::Status {
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| DashboardError::HttpClient(e.to_string()))?;

            serde_json::from_slice(&body).map_err(|e| DashboardError::Malformed(e.to_string()))
        }
    }
}

// ═══════════════════════════════════════════════════════════
// MockAnalyticsSource
// ═══════════════════════════════════════════════════════════

/// Replays a scripted sequence of fetch outcomes, repeating the last one.
pub struct MockAnalyticsSource {
    script: Mutex<Vec<Result<Vec<CaseRecord>, String>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockAnalyticsSource {
    pub fn returning(cases: Vec<CaseRecord>) -> Self {
        Self::scripted(vec![Ok(cases)])
    }

    /// Outcomes in order; `Err` becomes a connection failure.
    pub fn scripted(mut script: Vec<Result<Vec<CaseRecord>, String>>) -> Self {
        script.reverse();
        Self {
            script: Mutex::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Result<Vec<CaseRecord>, String> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        match script.len() {
            0 => Ok(Vec::new()),
            1 => script[0].clone(),
            _ => script.pop().unwrap_or_else(|| Ok(Vec::new())),
        }
    }
}

impl AnalyticsSource for MockAnalyticsSource {
    fn fetch_cases(&self) -> impl Future<Output = Result<Vec<CaseRecord>, DashboardError>> + Send {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.next_outcome();
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            outcome.map_err(DashboardError::Connection)
        }
    }
}
