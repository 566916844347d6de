//! Result view: presentation of a received diagnosis.

use serde::Serialize;

use crate::models::DiagnosisResult;

/// Two-way colour cue on the visual finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualCue {
    /// The photo was rejected by the vision check (red).
    Warning,
    /// Any other finding (green).
    Normal,
}

impl VisualCue {
    pub fn color_hex(self) -> &'static str {
        match self {
            VisualCue::Warning => "#DC2626",
            VisualCue::Normal => "#16A34A",
        }
    }
}

/// Keyword the vision check uses to mark a non-throat photo.
const INVALID_IMAGE_MARKER: &str = "Invalid";

/// Display model for the result screen. Strings pass through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub diagnosis: String,
    pub confidence: String,
    pub visual_finding: String,
    pub visual_cue: VisualCue,
    pub recommendation: String,
}

impl From<&DiagnosisResult> for ResultView {
    fn from(result: &DiagnosisResult) -> Self {
        Self {
            diagnosis: result.cough_diagnosis.clone(),
            confidence: confidence_percent(result.cough_confidence),
            visual_finding: result.visual_diagnosis.clone(),
            visual_cue: visual_cue(&result.visual_diagnosis),
            recommendation: result.final_recommendation.clone(),
        }
    }
}

/// Whole-number percentage, e.g. 0.87 → "87%".
pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

pub fn visual_cue(visual_diagnosis: &str) -> VisualCue {
    if visual_diagnosis.contains(INVALID_IMAGE_MARKER) {
        VisualCue::Warning
    } else {
        VisualCue::Normal
    }
}

impl ResultView {
    pub fn render_text(&self) -> String {
        format!(
            "Diagnosis Complete\n\
             Confidence: {}\n\
             PRIMARY DIAGNOSIS: {}\n\
             RECOMMENDATION: {}\n\
             Visual Findings: {}",
            self.confidence, self.diagnosis, self.recommendation, self.visual_finding
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(visual: &str) -> DiagnosisResult {
        DiagnosisResult {
            cough_diagnosis: "Bacterial".into(),
            cough_confidence: 0.87,
            visual_diagnosis: visual.into(),
            final_recommendation: "Start amoxicillin".into(),
        }
    }

    #[test]
    fn renders_confidence_and_literal_strings() {
        let view = ResultView::from(&result("Inflamed"));
        assert_eq!(view.confidence, "87%");
        assert_eq!(view.diagnosis, "Bacterial");
        assert_eq!(view.recommendation, "Start amoxicillin");
        assert_eq!(view.visual_finding, "Inflamed");

        let text = view.render_text();
        assert!(text.contains("Confidence: 87%"));
        assert!(text.contains("Start amoxicillin"));
    }

    #[test]
    fn confidence_bounds() {
        assert_eq!(confidence_percent(0.0), "0%");
        assert_eq!(confidence_percent(1.0), "100%");
        assert_eq!(confidence_percent(0.5), "50%");
    }

    #[test]
    fn invalid_image_gets_warning_cue() {
        let view = ResultView::from(&result("⚠️ Invalid Image (Not a Throat)"));
        assert_eq!(view.visual_cue, VisualCue::Warning);
        assert_eq!(view.visual_cue.color_hex(), "#DC2626");
    }

    #[test]
    fn other_findings_get_normal_cue() {
        assert_eq!(visual_cue("Healthy Appearance"), VisualCue::Normal);
        assert_eq!(visual_cue("Visible Inflammation"), VisualCue::Normal);
    }
}
