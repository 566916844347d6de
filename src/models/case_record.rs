use serde::{Deserialize, Serialize};

use super::case_draft::GeoPoint;
use super::enums::YesNo;

/// Read-only case projection served by the analytics endpoint.
///
/// Every column except `id` is nullable on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: i64,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub village_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub cough_diagnosis: Option<String>,
    #[serde(default)]
    pub breathing_difficulty: Option<String>,
    #[serde(default)]
    pub temperature: Option<String>,
    #[serde(default)]
    pub has_phlegm: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CaseRecord {
    fn diagnosis_contains(&self, needle: &str) -> bool {
        self.cough_diagnosis
            .as_deref()
            .is_some_and(|d| d.contains(needle))
    }

    pub fn is_bacterial(&self) -> bool {
        self.diagnosis_contains("Bacterial")
    }

    pub fn is_viral(&self) -> bool {
        self.diagnosis_contains("Viral")
    }

    /// Breathing difficulty reported; the ICU referral signal.
    pub fn is_critical(&self) -> bool {
        self.breathing_difficulty.as_deref() == Some(YesNo::Yes.as_str())
    }

    pub fn is_high_risk(&self) -> bool {
        self.is_bacterial() || self.is_critical()
    }

    /// Both coordinates, or nothing.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn record(id: i64, diagnosis: Option<&str>, breathing: &str) -> CaseRecord {
    CaseRecord {
        id,
        patient_name: Some(format!("Patient {id}")),
        village_name: Some("Rampur".into()),
        latitude: None,
        longitude: None,
        cough_diagnosis: diagnosis.map(str::to_string),
        breathing_difficulty: Some(breathing.into()),
        temperature: Some("101.2".into()),
        has_phlegm: Some("Yes".into()),
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_analytics_row_with_nulls() {
        let json = r#"{
            "id": 7,
            "patientName": "Ravi",
            "villageName": null,
            "latitude": 26.85,
            "longitude": null,
            "coughDiagnosis": "Viral",
            "breathingDifficulty": "No",
            "temperature": "99.1",
            "hasPhlegm": "No",
            "createdAt": "2025-01-14T09:12:44.512",
            "coughAudio": null
        }"#;
        let rec: CaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, 7);
        assert!(rec.village_name.is_none());
        assert!(rec.location().is_none());
        assert!(rec.is_viral());
        assert!(!rec.is_critical());
    }

    #[test]
    fn missing_optional_columns_default_to_none() {
        let rec: CaseRecord = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(rec.cough_diagnosis.is_none());
        assert!(!rec.is_bacterial());
        assert!(!rec.is_high_risk());
    }

    #[test]
    fn bacterial_matches_substring() {
        let rec = record(1, Some("Likely Bacterial Infection"), "No");
        assert!(rec.is_bacterial());
        assert!(rec.is_high_risk());
    }

    #[test]
    fn critical_requires_exact_yes() {
        assert!(record(1, None, "Yes").is_critical());
        assert!(!record(2, None, "yes").is_critical());
        assert!(!record(3, None, "No").is_critical());
    }

    #[test]
    fn location_needs_both_coordinates() {
        let mut rec = record(1, None, "No");
        rec.latitude = Some(20.0);
        assert!(rec.location().is_none());
        rec.longitude = Some(78.0);
        assert_eq!(rec.location().unwrap().longitude, 78.0);
    }
}
