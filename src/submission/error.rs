//! Submission error types.
//!
//! Variants stay distinct for logging, but the operator only ever sees
//! one generic failure notice for anything that went wrong on the wire.

use thiserror::Error;

use crate::models::ModelError;

/// Shown for every network, timeout, status or schema failure.
pub const GENERIC_FAILURE_NOTICE: &str =
    "Upload failed. Could not reach the diagnostic server. Please try again.";

pub const MISSING_CAPTURE_NOTICE: &str = "Please capture both photo and audio.";

pub const BUSY_NOTICE: &str = "A diagnosis is already running.";

pub const RESULT_PENDING_NOTICE: &str = "Start a new case before submitting again.";

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Capture incomplete (photo missing: {photo}, audio missing: {audio})")]
    MissingCapture { photo: bool, audio: bool },

    #[error("A submission is already in flight")]
    Busy,

    #[error("A result is on screen; reset before submitting")]
    ResultPending,

    #[error("Cannot connect to diagnostic service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Diagnostic service error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error(transparent)]
    Malformed(#[from] ModelError),
}

impl SubmissionError {
    /// The single message the operator sees for this failure.
    pub fn user_notice(&self) -> &'static str {
        match self {
            Self::MissingCapture { .. } => MISSING_CAPTURE_NOTICE,
            Self::Busy => BUSY_NOTICE,
            Self::ResultPending => RESULT_PENDING_NOTICE,
            _ => GENERIC_FAILURE_NOTICE,
        }
    }

    /// True when a request actually left the client.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(
            self,
            Self::MissingCapture { .. } | Self::Busy | Self::ResultPending
        )
    }
}
