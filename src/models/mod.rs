pub mod case_draft;
pub mod case_record;
pub mod diagnosis;
pub mod enums;
pub mod media;

pub use case_draft::{CaseDraft, GeoPoint};
pub use case_record::CaseRecord;
pub use diagnosis::DiagnosisResult;
pub use enums::{ResetPolicy, Surface, YesNo};
pub use media::{MediaAttachment, MediaKind};

/// Errors raised while parsing or validating domain values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Malformed diagnosis response: {0}")]
    MalformedResponse(String),
}
