use reqwest::multipart::{Form, Part};

use super::SubmissionError;
use crate::config::FormDefaults;
use crate::models::{CaseDraft, GeoPoint, MediaAttachment, YesNo};

/// Owned snapshot of a ready draft, with defaults applied.
#[derive(Debug, Clone)]
pub struct CaseSubmission {
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub village: String,
    pub temperature: String,
    pub symptom_days: String,
    pub has_phlegm: YesNo,
    pub breathing_difficulty: YesNo,
    pub location: Option<GeoPoint>,
    pub photo: MediaAttachment,
    pub audio: MediaAttachment,
}

impl CaseSubmission {
    /// Snapshot `draft`, substituting `defaults` for absent text.
    ///
    /// Fails when either media slot is empty; nothing else can block a submission.
    pub fn from_draft(draft: &CaseDraft, defaults: &FormDefaults) -> Result<Self, SubmissionError> {
        let (photo, audio) = match (&draft.photo, &draft.audio) {
            (Some(photo), Some(audio)) => (photo.clone(), audio.clone()),
            (photo, audio) => {
                return Err(SubmissionError::MissingCapture {
                    photo: photo.is_none(),
                    audio: audio.is_none(),
                })
            }
        };

        let or_default = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            patient_name: or_default(&draft.patient_name, &defaults.patient_name),
            age: or_default(&draft.age, &defaults.age),
            gender: or_default(&draft.gender, &defaults.gender),
            village: or_default(&draft.village, &defaults.village),
            temperature: or_default(&draft.temperature, &defaults.temperature),
            symptom_days: or_default(&draft.symptom_days, &defaults.symptom_days),
            has_phlegm: draft.has_phlegm.into(),
            breathing_difficulty: draft.breathing_difficulty.into(),
            location: draft.location,
            photo,
            audio,
        })
    }

    /// Text parts in wire order. Coordinates appear only when known.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("patientName", self.patient_name.clone()),
            ("age", self.age.clone()),
            ("gender", self.gender.clone()),
            ("village", self.village.clone()),
            ("temperature", self.temperature.clone()),
            ("symptomsDays", self.symptom_days.clone()),
            ("hasPhlegm", self.has_phlegm.as_str().to_string()),
            ("breathingDifficulty", self.breathing_difficulty.as_str().to_string()),
        ];
        if let Some(point) = self.location {
            fields.push(("latitude", point.latitude.to_string()));
            fields.push(("longitude", point.longitude.to_string()));
        }
        fields
    }

    /// Build the `multipart/form-data` body: `audio`, `image`, then text parts.
    pub fn into_form(self) -> Result<Form, SubmissionError> {
        let text_fields = self.text_fields();
        let mut form = Form::new()
            .part("audio", file_part(self.audio)?)
            .part("image", file_part(self.photo)?);
        for (name, value) in text_fields {
            form = form.text(name, value);
        }
        Ok(form)
    }

    pub fn payload_bytes(&self) -> usize {
        self.photo.size_bytes() + self.audio.size_bytes()
    }
}

fn file_part(media: MediaAttachment) -> Result<Part, SubmissionError> {
    Part::bytes(media.bytes)
        .file_name(media.file_name)
        .mime_str(&media.mime_type)
        .map_err(|e| SubmissionError::HttpClient(format!("Invalid media type: {e}")))
}
