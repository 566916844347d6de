use serde::{Deserialize, Serialize};

use super::ModelError;

/// Classification returned by the diagnostic backend for one submitted case.
///
/// The backend echoes the whole saved case; only these four fields are
/// consumed and every one of them is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub cough_diagnosis: String,
    pub cough_confidence: f64,
    pub visual_diagnosis: String,
    pub final_recommendation: String,
}

impl DiagnosisResult {
    /// Parse and validate a response body. Fails closed on any deviation.
    pub fn from_json(body: &[u8]) -> Result<Self, ModelError> {
        let parsed: Self = serde_json::from_slice(body)
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !self.cough_confidence.is_finite() || !(0.0..=1.0).contains(&self.cough_confidence) {
            return Err(ModelError::MalformedResponse(format!(
                "coughConfidence out of range: {}",
                self.cough_confidence
            )));
        }
        for (field, value) in [
            ("coughDiagnosis", &self.cough_diagnosis),
            ("visualDiagnosis", &self.visual_diagnosis),
            ("finalRecommendation", &self.final_recommendation),
        ] {
            if value.trim().is_empty() {
                return Err(ModelError::MalformedResponse(format!("{field} is empty")));
            }
        }
        Ok(())
    }
}
