//! Capture form: collects the minimum viable case draft.
//!
//! Text fields are stored as typed; nothing is validated at entry time.
//! The only hard precondition anywhere in the workflow is the media gate:
//! a case can be submitted once it holds one photo and one audio clip.

use serde::Serialize;

use crate::models::{CaseDraft, GeoPoint, MediaAttachment, ResetPolicy};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Where the held audio clip came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    Recorded,
    Selected,
}

/// Outcome of the submit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Missing { photo: bool, audio: bool },
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("A recording is already in progress")]
    AlreadyRecording,
    #[error("No recording in progress")]
    NotRecording,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("No location fix: {0}")]
    Unavailable(String),
}

/// Device location lookup. A single best-effort read per form mount.
pub trait LocationProvider {
    fn current_position(&self) -> Result<GeoPoint, LocationError>;
}

/// Provider for devices without location access.
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn current_position(&self) -> Result<GeoPoint, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Provider returning a fixed position (site-configured clinics, tests).
pub struct FixedLocation(pub GeoPoint);

impl LocationProvider for FixedLocation {
    fn current_position(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.0)
    }
}

// ═══════════════════════════════════════════════════════════
// CaptureForm
// ═══════════════════════════════════════════════════════════

/// Mutable capture state owned by a single case session.
#[derive(Debug, Clone, Default)]
pub struct CaptureForm {
    draft: CaseDraft,
    recording: bool,
    audio_source: Option<AudioSource>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl CaptureForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &CaseDraft {
        &self.draft
    }

    // ── Form mount ──────────────────────────────────────────

    /// Read the device location once. Failure simply leaves it unset.
    pub fn mount(&mut self, provider: &dyn LocationProvider) {
        match provider.current_position() {
            Ok(point) => {
                tracing::debug!(
                    latitude = point.latitude,
                    longitude = point.longitude,
                    "Capture form: location acquired"
                );
                self.draft.location = Some(point);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Capture form: location omitted");
            }
        }
    }

    pub fn set_location(&mut self, location: Option<GeoPoint>) {
        self.draft.location = location;
    }

    // ── Identity & vitals ───────────────────────────────────

    pub fn set_patient_name(&mut self, value: &str) {
        self.draft.patient_name = non_blank(value);
    }

    pub fn set_age(&mut self, value: &str) {
        self.draft.age = non_blank(value);
    }

    pub fn set_gender(&mut self, value: &str) {
        self.draft.gender = non_blank(value);
    }

    pub fn set_village(&mut self, value: &str) {
        self.draft.village = non_blank(value);
    }

    pub fn set_temperature(&mut self, value: &str) {
        self.draft.temperature = non_blank(value);
    }

    pub fn set_symptom_days(&mut self, value: &str) {
        self.draft.symptom_days = non_blank(value);
    }

    pub fn set_has_phlegm(&mut self, flag: bool) {
        self.draft.has_phlegm = flag;
    }

    pub fn set_breathing_difficulty(&mut self, flag: bool) {
        self.draft.breathing_difficulty = flag;
    }

    // ── Photo ───────────────────────────────────────────────

    /// Hold a new still. Any previous photo is discarded.
    pub fn capture_photo(&mut self, photo: MediaAttachment) {
        tracing::debug!(size = photo.size_bytes(), mime = %photo.mime_type, "Photo captured");
        self.draft.photo = Some(photo);
    }

    pub fn retake_photo(&mut self) {
        self.draft.photo = None;
    }

    // ── Audio ───────────────────────────────────────────────

    /// Begin a new recording, discarding whatever clip is currently held.
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        if self.recording {
            return Err(CaptureError::AlreadyRecording);
        }
        self.draft.audio = None;
        self.audio_source = None;
        self.recording = true;
        Ok(())
    }

    /// Stop the in-progress recording and hold the resulting clip.
    pub fn finish_recording(&mut self, clip: MediaAttachment) -> Result<(), CaptureError> {
        if !self.recording {
            return Err(CaptureError::NotRecording);
        }
        self.recording = false;
        self.draft.audio = Some(clip);
        self.audio_source = Some(AudioSource::Recorded);
        Ok(())
    }

    pub fn cancel_recording(&mut self) {
        self.recording = false;
    }

    /// Use an existing audio file. Replaces a recorded clip and cancels any recording.
    pub fn select_audio_file(&mut self, clip: MediaAttachment) {
        self.recording = false;
        self.draft.audio = Some(clip);
        self.audio_source = Some(AudioSource::Selected);
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn audio_source(&self) -> Option<AudioSource> {
        self.audio_source
    }

    // ── Gate & reset ────────────────────────────────────────

    pub fn readiness(&self) -> Readiness {
        let photo = !self.draft.has_photo();
        let audio = !self.draft.has_audio();
        if photo || audio {
            Readiness::Missing { photo, audio }
        } else {
            Readiness::Ready
        }
    }

    /// Return to an empty form. Media are always dropped.
    pub fn reset(&mut self, policy: ResetPolicy) {
        let kept = self.draft.clone();
        self.draft.clear_patient();
        if policy == ResetPolicy::KeepIdentity {
            self.draft.patient_name = kept.patient_name;
            self.draft.age = kept.age;
            self.draft.gender = kept.gender;
            self.draft.village = kept.village;
        }
        self.recording = false;
        self.audio_source = None;
    }
}
