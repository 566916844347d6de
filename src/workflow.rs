//! Case session: the Capture → Result toggle and its single-flight guard.
//!
//! The session owns the capture form and the current screen. A submission
//! snapshots the draft under a short state lock, releases it, and awaits
//! the diagnosis service while holding only the in-flight token. A second
//! submit during that window is rejected without touching anything.

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::capture::{CaptureForm, LocationProvider};
use crate::config::FormDefaults;
use crate::models::{DiagnosisResult, ResetPolicy};
use crate::result_view::ResultView;
use crate::submission::{CaseSubmission, DiagnosisService, SubmissionError};

/// Which of the two screens is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Capture,
    Result(DiagnosisResult),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Capture => "capture",
            Screen::Result(_) => "result",
        }
    }

    pub fn result_view(&self) -> Option<ResultView> {
        match self {
            Screen::Capture => None,
            Screen::Result(result) => Some(ResultView::from(result)),
        }
    }
}

struct SessionState {
    form: CaptureForm,
    screen: Screen,
}

/// One operator's capture-and-submit workflow.
pub struct CaseSession<S> {
    pub session_id: Uuid,
    service: S,
    defaults: FormDefaults,
    reset_policy: ResetPolicy,
    state: Mutex<SessionState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl<S: DiagnosisService> CaseSession<S> {
    pub fn new(service: S, defaults: FormDefaults, reset_policy: ResetPolicy) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            service,
            defaults,
            reset_policy,
            state: Mutex::new(SessionState {
                form: CaptureForm::new(),
                screen: Screen::Capture,
            }),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    // Poisoning is ignored: the state is recovered as left by the panicking holder.
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Is a submission currently awaiting the backend?
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub fn screen(&self) -> Screen {
        self.lock_state().screen.clone()
    }

    /// Read the capture form.
    pub fn inspect<R>(&self, f: impl FnOnce(&CaptureForm) -> R) -> R {
        f(&self.lock_state().form)
    }

    /// Edit the capture form. Rejected while a submission is in flight.
    ///
    /// The in-flight token is held for the whole edit, so a submit cannot
    /// snapshot the draft halfway through it.
    pub fn edit<R>(&self, f: impl FnOnce(&mut CaptureForm) -> R) -> Result<R, SubmissionError> {
        let Ok(_edit) = self.in_flight.try_lock() else {
            return Err(SubmissionError::Busy);
        };
        Ok(f(&mut self.lock_state().form))
    }

    /// Best-effort location read when the form is shown.
    pub fn mount(&self, provider: &dyn LocationProvider) {
        self.lock_state().form.mount(provider);
    }

    /// Submit the current draft and move to the result screen on success.
    ///
    /// On any failure the screen stays on Capture with all captured media held.
    pub async fn submit(&self) -> Result<DiagnosisResult, SubmissionError> {
        let Ok(_flight) = self.in_flight.try_lock() else {
            tracing::debug!(session = %self.session_id, "Submit ignored: already in flight");
            return Err(SubmissionError::Busy);
        };

        let submission = {
            let state = self.lock_state();
            if matches!(state.screen, Screen::Result(_)) {
                return Err(SubmissionError::ResultPending);
            }
            CaseSubmission::from_draft(state.form.draft(), &self.defaults)?
        };

        let outcome = self.service.submit(submission).await;

        let mut state = self.lock_state();
        match outcome {
            Ok(result) => {
                tracing::info!(session = %self.session_id, "Case diagnosed");
                state.screen = Screen::Result(result.clone());
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "Case submission failed");
                state.screen = Screen::Capture;
                Err(e)
            }
        }
    }

    /// Start a new case: drop the result and media, back to Capture.
    pub fn reset(&self) -> Result<(), SubmissionError> {
        if self.is_busy() {
            return Err(SubmissionError::Busy);
        }
        let mut state = self.lock_state();
        state.form.reset(self.reset_policy);
        state.screen = Screen::Capture;
        tracing::debug!(session = %self.session_id, policy = %self.reset_policy, "Case reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaAttachment;
    use crate::submission::MockDiagnosisService;
    use std::sync::Arc;

    fn diagnosis() -> DiagnosisResult {
        DiagnosisResult {
            cough_diagnosis: "Bacterial".into(),
            cough_confidence: 0.87,
            visual_diagnosis: "Inflamed".into(),
            final_recommendation: "Start amoxicillin".into(),
        }
    }

    fn session(service: MockDiagnosisService) -> CaseSession<MockDiagnosisService> {
        CaseSession::new(service, FormDefaults::mobile(), ResetPolicy::ClearAll)
    }

    fn capture_media<S: DiagnosisService>(session: &CaseSession<S>) {
        session
            .edit(|form| {
                form.capture_photo(MediaAttachment::photo("throat.jpg", vec![1]));
                form.select_audio_file(MediaAttachment::audio("cough.wav", vec![2]));
            })
            .unwrap();
    }

    #[tokio::test]
    async fn submit_without_media_never_reaches_service() {
        let session = session(MockDiagnosisService::succeeding(diagnosis()));

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SubmissionError::MissingCapture { .. }));

        session
            .edit(|form| form.capture_photo(MediaAttachment::photo("t.jpg", vec![1])))
            .unwrap();
        let err = session.submit().await.unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::MissingCapture {
                photo: false,
                audio: true
            }
        ));

        assert_eq!(session.service().calls(), 0);
        assert_eq!(session.screen(), Screen::Capture);
    }

    #[tokio::test]
    async fn success_moves_to_result_screen() {
        let session = session(MockDiagnosisService::succeeding(diagnosis()));
        capture_media(&session);

        let result = session.submit().await.unwrap();
        assert_eq!(result, diagnosis());

        let view = session.screen().result_view().unwrap();
        assert_eq!(view.confidence, "87%");
        assert_eq!(view.diagnosis, "Bacterial");
        assert_eq!(view.recommendation, "Start amoxicillin");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn failure_stays_on_capture_with_media() {
        let session = session(MockDiagnosisService::failing());
        capture_media(&session);

        let err = session.submit().await.unwrap_err();
        assert!(err.is_transport_failure());
        assert_eq!(session.screen(), Screen::Capture);
        assert!(session.inspect(|form| form.readiness().is_ready()));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn submit_while_busy_has_no_side_effect() {
        let (mock, gate) = MockDiagnosisService::succeeding(diagnosis()).gated();
        let session = Arc::new(session(mock));
        capture_media(&session);

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit().await })
        };

        while session.service().calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(session.is_busy());

        let second = session.submit().await;
        assert!(matches!(second, Err(SubmissionError::Busy)));
        assert!(matches!(session.reset(), Err(SubmissionError::Busy)));
        assert!(session.edit(|form| form.retake_photo()).is_err());
        assert_eq!(session.service().calls(), 1);

        gate.notify_one();
        let result = first.await.unwrap().unwrap();
        assert_eq!(result.cough_diagnosis, "Bacterial");
        assert_eq!(session.service().calls(), 1);
    }

    #[tokio::test]
    async fn edit_holds_in_flight_token() {
        let session = session(MockDiagnosisService::succeeding(diagnosis()));
        capture_media(&session);

        let (busy, reset) = session
            .edit(|form| {
                form.retake_photo();
                (session.is_busy(), session.reset())
            })
            .unwrap();
        assert!(busy);
        assert!(matches!(reset, Err(SubmissionError::Busy)));
        assert!(!session.is_busy());

        let err = session.submit().await.unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::MissingCapture {
                photo: true,
                audio: false
            }
        ));
        assert_eq!(session.service().calls(), 0);
    }

    #[tokio::test]
    async fn reset_clears_media_and_result_then_blocks_submit() {
        let session = session(MockDiagnosisService::succeeding(diagnosis()));
        capture_media(&session);
        session.submit().await.unwrap();

        session.reset().unwrap();
        assert_eq!(session.screen(), Screen::Capture);
        assert!(session.inspect(|form| {
            !form.draft().has_photo() && !form.draft().has_audio()
        }));

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SubmissionError::MissingCapture { .. }));
        assert_eq!(session.service().calls(), 1);
    }

    #[tokio::test]
    async fn resubmit_from_result_screen_is_rejected() {
        let session = session(MockDiagnosisService::succeeding(diagnosis()));
        capture_media(&session);
        session.submit().await.unwrap();

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SubmissionError::ResultPending));
        assert_eq!(session.service().calls(), 1);
    }

    #[tokio::test]
    async fn defaults_are_applied_to_submission() {
        let session = session(MockDiagnosisService::succeeding(diagnosis()));
        capture_media(&session);
        session.submit().await.unwrap();

        let sent = session.service().last_submission().unwrap();
        assert_eq!(sent.patient_name, "Mobile User");
        assert_eq!(sent.temperature, "98.6");
    }
}
