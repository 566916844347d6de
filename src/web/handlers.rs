use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;

use super::error::WebError;
use super::pages;
use crate::capture::{CaptureForm, Readiness};
use crate::dashboard::DashboardSnapshot;
use crate::models::{GeoPoint, MediaAttachment, MediaKind};
use crate::result_view::ResultView;
use crate::state::AppState;
use crate::submission::error::{BUSY_NOTICE, RESULT_PENDING_NOTICE};
use crate::submission::{DiagnosisService, SubmissionError};
use crate::workflow::Screen;

type SharedState<S> = State<Arc<AppState<S>>>;

// ═══════════════════════════════════════════════════════════
// Pages
// ═══════════════════════════════════════════════════════════

pub async fn landing() -> Html<String> {
    Html(pages::landing_page())
}

pub async fn health() -> &'static str {
    "ok"
}

fn render_capture<S: DiagnosisService>(
    state: &AppState<S>,
    status: StatusCode,
    notice: Option<&str>,
) -> Response {
    let defaults = state.form_defaults();
    let html = state
        .session
        .inspect(|form| pages::capture_page(form, &defaults, notice));
    (status, Html(html)).into_response()
}

fn render_screen<S: DiagnosisService>(
    state: &AppState<S>,
    status: StatusCode,
    notice: Option<&str>,
) -> Response {
    match state.session.screen().result_view() {
        Some(view) => (status, Html(pages::result_page(&view, notice))).into_response(),
        None => render_capture(state, status, notice),
    }
}

/// GET /capture: the form, or the held result until reset.
pub async fn capture_form<S: DiagnosisService>(State(state): SharedState<S>) -> Response {
    if state.session.screen() == Screen::Capture
        && state.session.inspect(|f| f.draft().location.is_none())
    {
        state.session.mount(state.location_provider());
    }
    render_screen(&state, StatusCode::OK, None)
}

/// POST /capture: apply the uploaded fields, then submit.
pub async fn capture_submit<S: DiagnosisService>(
    State(state): SharedState<S>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    if matches!(state.session.screen(), Screen::Result(_)) {
        return Ok(render_screen(
            &state,
            StatusCode::CONFLICT,
            Some(RESULT_PENDING_NOTICE),
        ));
    }

    let upload = CaptureUpload::read(multipart).await?;
    if state.session.edit(|form| upload.apply(form)).is_err() {
        return Ok(render_capture(&state, StatusCode::CONFLICT, Some(BUSY_NOTICE)));
    }

    let response = match state.session.submit().await {
        Ok(_) => render_screen(&state, StatusCode::OK, None),
        Err(e @ SubmissionError::MissingCapture { .. }) => {
            render_capture(&state, StatusCode::UNPROCESSABLE_ENTITY, Some(e.user_notice()))
        }
        Err(e @ (SubmissionError::Busy | SubmissionError::ResultPending)) => {
            render_screen(&state, StatusCode::CONFLICT, Some(e.user_notice()))
        }
        Err(e) => render_capture(&state, StatusCode::BAD_GATEWAY, Some(e.user_notice())),
    };
    Ok(response)
}

/// POST /reset: back to an empty form.
pub async fn reset<S: DiagnosisService>(State(state): SharedState<S>) -> Result<Redirect, WebError> {
    state.session.reset()?;
    Ok(Redirect::to("/capture"))
}

pub async fn dashboard_page<S: DiagnosisService>(State(state): SharedState<S>) -> Html<String> {
    let snapshot = state.dashboard.snapshot();
    Html(pages::dashboard_page(
        &snapshot,
        state.config.poll_interval.as_secs().max(1),
    ))
}

// ═══════════════════════════════════════════════════════════
// JSON
// ═══════════════════════════════════════════════════════════

pub async fn dashboard_json<S: DiagnosisService>(
    State(state): SharedState<S>,
) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatus {
    pub session_id: String,
    pub busy: bool,
    pub readiness: Readiness,
    pub screen: &'static str,
    pub result: Option<ResultView>,
}

/// GET /api/case: where the current case stands.
pub async fn case_status<S: DiagnosisService>(State(state): SharedState<S>) -> Json<CaseStatus> {
    let screen = state.session.screen();
    Json(CaseStatus {
        session_id: state.session.session_id.to_string(),
        busy: state.session.is_busy(),
        readiness: state.session.inspect(CaptureForm::readiness),
        screen: screen.name(),
        result: screen.result_view(),
    })
}

// ═══════════════════════════════════════════════════════════
// Multipart intake
// ═══════════════════════════════════════════════════════════

/// Fields posted by the capture page.
#[derive(Debug, Default)]
pub(crate) struct CaptureUpload {
    text: HashMap<String, String>,
    photo: Option<MediaAttachment>,
    audio: Option<MediaAttachment>,
}

fn is_checked(value: Option<&String>) -> bool {
    value.is_some_and(|v| matches!(v.trim(), "Yes" | "yes" | "on" | "true"))
}

impl CaptureUpload {
    pub(crate) async fn read(mut multipart: Multipart) -> Result<Self, WebError> {
        let mut upload = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            let Some(kind) = media_kind(&name) else {
                if !name.is_empty() {
                    let value = field.text().await?;
                    upload.text.insert(name, value);
                }
                continue;
            };

            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            // An untouched file input posts an empty part.
            if bytes.is_empty() {
                continue;
            }
            let media = attachment(kind, &file_name, content_type, bytes.to_vec());
            match kind {
                MediaKind::Photo => upload.photo = Some(media),
                MediaKind::Audio => upload.audio = Some(media),
            }
        }

        Ok(upload)
    }

    pub(crate) fn apply(&self, form: &mut CaptureForm) {
        let text = |key: &str| self.text.get(key).map(String::as_str);

        if let Some(v) = text("patientName") {
            form.set_patient_name(v);
        }
        if let Some(v) = text("age") {
            form.set_age(v);
        }
        if let Some(v) = text("gender") {
            form.set_gender(v);
        }
        if let Some(v) = text("village") {
            form.set_village(v);
        }
        if let Some(v) = text("temperature") {
            form.set_temperature(v);
        }
        if let Some(v) = text("symptomsDays") {
            form.set_symptom_days(v);
        }
        form.set_has_phlegm(is_checked(self.text.get("hasPhlegm")));
        form.set_breathing_difficulty(is_checked(self.text.get("breathingDifficulty")));

        let coordinate = |key: &str| text(key).and_then(|v| v.trim().parse::<f64>().ok());
        if let (Some(lat), Some(lon)) = (coordinate("latitude"), coordinate("longitude")) {
            match GeoPoint::new(lat, lon) {
                Some(point) => form.set_location(Some(point)),
                None => tracing::debug!(lat, lon, "Ignoring out-of-range location"),
            }
        }

        if let Some(photo) = &self.photo {
            form.capture_photo(photo.clone());
        }
        if let Some(audio) = &self.audio {
            form.select_audio_file(audio.clone());
        }
    }
}

fn media_kind(field_name: &str) -> Option<MediaKind> {
    match field_name {
        "image" => Some(MediaKind::Photo),
        "audio" => Some(MediaKind::Audio),
        _ => None,
    }
}

/// Build an attachment, trusting the browser's content type when it parses
/// and names the right family. Otherwise the extension-inferred type stays.
fn attachment(
    kind: MediaKind,
    file_name: &str,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> MediaAttachment {
    let mut media = match kind {
        MediaKind::Photo => MediaAttachment::photo(file_name, bytes),
        MediaKind::Audio => MediaAttachment::audio(file_name, bytes),
    };
    let family = match kind {
        MediaKind::Photo => "image",
        MediaKind::Audio => "audio",
    };
    let browser_mime = content_type
        .as_deref()
        .and_then(|ct| ct.parse::<mime_guess::Mime>().ok())
        .filter(|mime| mime.type_().as_str() == family);
    match browser_mime {
        Some(mime) => media.mime_type = mime.to_string(),
        None => {
            if let Some(ct) = content_type {
                tracing::debug!(content_type = %ct, kept = %media.mime_type, "Ignoring browser content type");
            }
        }
    }
    media
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefaults;
    use crate::submission::CaseSubmission;

    #[test]
    fn checkbox_values() {
        assert!(is_checked(Some(&"Yes".to_string())));
        assert!(is_checked(Some(&"on".to_string())));
        assert!(!is_checked(Some(&"No".to_string())));
        assert!(!is_checked(None));
    }

    #[test]
    fn browser_content_type_wins_within_family() {
        let media = attachment(
            MediaKind::Audio,
            "blob",
            Some("audio/webm".into()),
            vec![1],
        );
        assert_eq!(media.mime_type, "audio/webm");
        assert_eq!(media.file_name, "blob");

        let media = attachment(
            MediaKind::Photo,
            "throat.png",
            Some("application/octet-stream".into()),
            vec![1],
        );
        assert_eq!(media.mime_type, "image/png");
    }

    #[test]
    fn malformed_content_type_falls_back_to_extension() {
        let media = attachment(
            MediaKind::Audio,
            "cough.mp3",
            Some("audio/ bad type".into()),
            vec![1],
        );
        assert_eq!(media.mime_type, "audio/mpeg");

        let mut form = CaptureForm::new();
        form.capture_photo(MediaAttachment::photo("throat.jpg", vec![1]));
        form.select_audio_file(media);
        let submission = CaseSubmission::from_draft(form.draft(), &FormDefaults::web()).unwrap();
        assert!(submission.into_form().is_ok());
    }

    #[test]
    fn apply_keeps_held_media_and_unchecked_boxes_clear() {
        let mut form = CaptureForm::new();
        form.capture_photo(MediaAttachment::photo("old.jpg", vec![1]));
        form.set_has_phlegm(true);

        let upload = CaptureUpload {
            text: HashMap::from([
                ("patientName".to_string(), "Ravi".to_string()),
                ("latitude".to_string(), "12.5".to_string()),
                ("longitude".to_string(), "200".to_string()),
            ]),
            photo: None,
            audio: Some(MediaAttachment::audio("c.wav", vec![2])),
        };
        upload.apply(&mut form);

        let draft = form.draft();
        assert_eq!(draft.patient_name.as_deref(), Some("Ravi"));
        assert_eq!(draft.photo.as_ref().unwrap().file_name, "old.jpg");
        assert!(draft.has_audio());
        assert!(!draft.has_phlegm);
        assert!(draft.location.is_none());
    }
}
