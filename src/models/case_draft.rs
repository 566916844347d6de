use serde::{Deserialize, Serialize};

use super::media::MediaAttachment;

/// A device location fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns `None` for coordinates outside the WGS84 range or non-finite input.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// In-progress, unsubmitted patient capture.
///
/// Text fields hold exactly what the operator typed; defaults are applied
/// when the submission is built, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseDraft {
    pub patient_name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub village: Option<String>,
    pub temperature: Option<String>,
    pub symptom_days: Option<String>,
    pub has_phlegm: bool,
    pub breathing_difficulty: bool,
    pub photo: Option<MediaAttachment>,
    pub audio: Option<MediaAttachment>,
    pub location: Option<GeoPoint>,
}

impl CaseDraft {
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Forget everything about the patient but keep the device location.
    pub fn clear_patient(&mut self) {
        *self = Self {
            location: self.location,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_point_accepts_valid_range() {
        let p = GeoPoint::new(20.5937, 78.9629).unwrap();
        assert_eq!(p.latitude, 20.5937);
        assert!(GeoPoint::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -181.0).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn clear_patient_keeps_location() {
        let mut draft = CaseDraft {
            patient_name: Some("Asha".into()),
            has_phlegm: true,
            photo: Some(MediaAttachment::photo("t.jpg", vec![1])),
            location: GeoPoint::new(12.0, 77.0),
            ..CaseDraft::default()
        };
        draft.clear_patient();
        assert!(draft.patient_name.is_none());
        assert!(!draft.has_phlegm);
        assert!(!draft.has_photo());
        assert!(draft.location.is_some());
    }
}
