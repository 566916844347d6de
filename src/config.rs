use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;

use crate::models::enums::{ResetPolicy, Surface};

/// Application-level constants
pub const APP_NAME: &str = "Bact-Trace";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Case-submission endpoint of the core backend.
pub const DEFAULT_CASES_URL: &str = "http://localhost:8080/api/cases";

/// Read endpoint polled by the surveillance dashboard.
pub const DEFAULT_ANALYTICS_URL: &str = "http://localhost:8080/api/cases/analytics";

/// Client-side bound on a single case submission.
pub const SUBMIT_TIMEOUT_SECS: u64 = 20;

/// Dashboard refresh cadence.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Maximum entries shown in the high-risk alert feed.
pub const ALERT_FEED_LIMIT: usize = 10;

/// Where the local operator surface listens.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Fallback filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "bact_trace_lib=info,bact_trace=info,hyper=warn"
}

// ═══════════════════════════════════════════════════════════
// Form defaults
// ═══════════════════════════════════════════════════════════

/// Values substituted at submit time for fields the operator left empty.
///
/// The two surfaces historically disagreed on identity defaults, so each
/// carries its own set. Vital defaults match the diagnostic service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDefaults {
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub village: String,
    pub temperature: String,
    pub symptom_days: String,
}

impl FormDefaults {
    pub fn mobile() -> Self {
        Self {
            patient_name: "Mobile User".into(),
            age: "30".into(),
            gender: "Male".into(),
            village: "Mobile Clinic".into(),
            temperature: "98.6".into(),
            symptom_days: "1".into(),
        }
    }

    pub fn web() -> Self {
        Self {
            patient_name: "Anonymous".into(),
            age: "0".into(),
            village: "Remote Village A".into(),
            ..Self::mobile()
        }
    }

    pub fn for_surface(surface: Surface) -> Self {
        match surface {
            Surface::Mobile => Self::mobile(),
            Surface::Web => Self::web(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// ClientConfig
// ═══════════════════════════════════════════════════════════

/// Runtime configuration for the capture client and dashboard.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub cases_url: String,
    pub analytics_url: String,
    pub submit_timeout: Duration,
    pub poll_interval: Duration,
    pub bind_addr: SocketAddr,
    pub surface: Surface,
    pub reset_policy: ResetPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cases_url: DEFAULT_CASES_URL.into(),
            analytics_url: DEFAULT_ANALYTICS_URL.into(),
            submit_timeout: Duration::from_secs(SUBMIT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            surface: Surface::Mobile,
            reset_policy: ResetPolicy::ClearAll,
        }
    }
}

impl ClientConfig {
    /// Build the configuration from `BACT_TRACE_*` environment variables.
    ///
    /// Missing variables keep their defaults. Unparseable values are
    /// logged and ignored rather than aborting startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("BACT_TRACE_CASES_URL") {
            config.cases_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("BACT_TRACE_ANALYTICS_URL") {
            config.analytics_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var(&lookup, "BACT_TRACE_SUBMIT_TIMEOUT_SECS", |v| {
            v.parse::<u64>().ok().filter(|s| *s > 0)
        }) {
            config.submit_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "BACT_TRACE_POLL_INTERVAL_SECS", |v| {
            v.parse::<u64>().ok().filter(|s| *s > 0)
        }) {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(addr) = parse_var(&lookup, "BACT_TRACE_BIND", |v| v.parse().ok()) {
            config.bind_addr = addr;
        }
        if let Some(surface) = parse_var(&lookup, "BACT_TRACE_SURFACE", |v| v.parse().ok()) {
            config.surface = surface;
        }
        if let Some(policy) = parse_var(&lookup, "BACT_TRACE_RESET", |v| v.parse().ok()) {
            config.reset_policy = policy;
        }

        config
    }

    /// Defaults for the configured surface.
    pub fn form_defaults(&self) -> FormDefaults {
        FormDefaults::for_surface(self.surface)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
    }
    parsed
}
