//! Submission client: packages a ready draft into one multipart request.
//!
//! No retries and no partial-success handling: a request either yields a
//! validated `DiagnosisResult` or a single failure.

pub mod client;
pub mod error;
pub mod form;

pub use client::{DiagnosisService, HttpDiagnosisClient, MockDiagnosisService};
pub use error::SubmissionError;
pub use form::CaseSubmission;
