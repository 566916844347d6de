//! Shared application state.
//!
//! One `AppState` is built at startup and wrapped in `Arc`; the web
//! handlers and the dashboard poller both hold clones of it.

use std::sync::Arc;

use crate::capture::{LocationProvider, NoLocation};
use crate::config::{ClientConfig, FormDefaults};
use crate::dashboard::{DashboardError, DashboardStore};
use crate::submission::{DiagnosisService, HttpDiagnosisClient, SubmissionError};
use crate::workflow::CaseSession;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Cannot build diagnosis client: {0}")]
    DiagnosisClient(#[from] SubmissionError),

    #[error("Cannot build analytics client: {0}")]
    AnalyticsClient(#[from] DashboardError),

    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Server error: {0}")]
    Server(String),
}

// ═══════════════════════════════════════════════════════════
// AppState
// ═══════════════════════════════════════════════════════════

pub struct AppState<S = HttpDiagnosisClient> {
    pub config: ClientConfig,
    pub session: CaseSession<S>,
    pub dashboard: Arc<DashboardStore>,
    location: Box<dyn LocationProvider + Send + Sync>,
}

impl AppState<HttpDiagnosisClient> {
    /// Wire the real HTTP diagnosis client from configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self, AppError> {
        let client = HttpDiagnosisClient::new(&config.cases_url, config.submit_timeout)?;
        Ok(Self::with_service(config, client))
    }
}

impl<S: DiagnosisService> AppState<S> {
    pub fn with_service(config: ClientConfig, service: S) -> Self {
        let session = CaseSession::new(service, config.form_defaults(), config.reset_policy);
        tracing::debug!(
            session = %session.session_id,
            surface = %config.surface,
            "Case session created"
        );
        Self {
            session,
            dashboard: Arc::new(DashboardStore::new()),
            location: Box::new(NoLocation),
            config,
        }
    }

    pub fn with_location_provider(
        mut self,
        provider: impl LocationProvider + Send + Sync + 'static,
    ) -> Self {
        self.location = Box::new(provider);
        self
    }

    pub fn location_provider(&self) -> &dyn LocationProvider {
        self.location.as_ref()
    }

    pub fn form_defaults(&self) -> FormDefaults {
        self.config.form_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FixedLocation;
    use crate::models::{GeoPoint, ResetPolicy, Surface};
    use crate::submission::MockDiagnosisService;

    #[test]
    fn from_config_uses_surface_defaults() {
        let config = ClientConfig {
            surface: Surface::Web,
            ..ClientConfig::default()
        };
        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.form_defaults().patient_name, "Anonymous");
        assert_eq!(
            state.session.service().cases_url(),
            "http://localhost:8080/api/cases"
        );
    }

    #[test]
    fn location_provider_feeds_mount() {
        let point = GeoPoint::new(12.97, 77.59).unwrap();
        let state = AppState::with_service(
            ClientConfig {
                reset_policy: ResetPolicy::KeepIdentity,
                ..ClientConfig::default()
            },
            MockDiagnosisService::failing(),
        )
        .with_location_provider(FixedLocation(point));

        state.session.mount(state.location_provider());
        assert_eq!(state.session.inspect(|f| f.draft().location), Some(point));
    }
}
