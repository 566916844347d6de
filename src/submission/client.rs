use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use super::form::CaseSubmission;
use super::SubmissionError;
use crate::models::DiagnosisResult;

/// Anything that can turn a case submission into a diagnosis.
pub trait DiagnosisService: Send + Sync {
    fn submit(
        &self,
        submission: CaseSubmission,
    ) -> impl Future<Output = Result<DiagnosisResult, SubmissionError>> + Send;
}

// ═══════════════════════════════════════════════════════════
// HttpDiagnosisClient
// ═══════════════════════════════════════════════════════════

/// Posts cases to the core backend as `multipart/form-data`.
pub struct HttpDiagnosisClient {
    cases_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpDiagnosisClient {
    pub fn new(cases_url: &str, timeout: Duration) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SubmissionError::HttpClient(e.to_string()))?;

        Ok(Self {
            cases_url: cases_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn cases_url(&self) -> &str {
        &self.cases_url
    }
}

impl DiagnosisService for HttpDiagnosisClient {
    fn submit(
        &self,
        submission: CaseSubmission,
    ) -> impl Future<Output = Result<DiagnosisResult, SubmissionError>> + Send {
        async move {
            tracing::info!(
                url = %self.cases_url,
                payload_bytes = submission.payload_bytes(),
                has_location = submission.location.is_some(),
                "Submitting case for diagnosis"
            );

            let form = submission.into_form()?;

            let response = self
                .client
                .post(&self.cases_url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        SubmissionError::Timeout(self.timeout_secs)
                    } else if e.is_connect() {
                        SubmissionError::Connection(self.cases_url.clone())
                    } else {
                        SubmissionError::HttpClient(e.to_string())
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SubmissionError::Server {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    SubmissionError::Timeout(self.timeout_secs)
                } else {
                    SubmissionError::HttpClient(e.to_string())
                }
            })?;

            let result = DiagnosisResult::from_json(&body)?;
            tracing::info!(
                diagnosis = %result.cough_diagnosis,
                confidence = result.cough_confidence,
                "Diagnosis received"
            );
            Ok(result)
        }
    }
}

// ═══════════════════════════════════════════════════════════
// MockDiagnosisService
// ═══════════════════════════════════════════════════════════

/// Scripted diagnosis service for testing.
///
/// Returns the configured result, or a connection failure when none is set.
/// With a gate installed, each call waits for one notification.
pub struct MockDiagnosisService {
    result: Option<DiagnosisResult>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    last_submission: Mutex<Option<CaseSubmission>>,
}

impl MockDiagnosisService {
    pub fn succeeding(result: DiagnosisResult) -> Self {
        Self {
            result: Some(result),
            gate: None,
            calls: AtomicUsize::new(0),
            last_submission: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            gate: None,
            calls: AtomicUsize::new(0),
            last_submission: Mutex::new(None),
        }
    }

    /// Hold every call until the returned `Notify` is signalled.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_submission(&self) -> Option<CaseSubmission> {
        self.last_submission.lock().ok()?.clone()
    }
}

impl DiagnosisService for MockDiagnosisService {
    fn submit(
        &self,
        submission: CaseSubmission,
    ) -> impl Future<Output = Result<DiagnosisResult, SubmissionError>> + Send {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_submission.lock() {
                *last = Some(submission);
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.result
                .clone()
                .ok_or_else(|| SubmissionError::Connection("mock".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefaults;
    use crate::models::{CaseDraft, MediaAttachment};
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;

    fn submission() -> CaseSubmission {
        let draft = CaseDraft {
            patient_name: Some("Asha".into()),
            photo: Some(MediaAttachment::photo("throat.png", vec![0x89, 0x50])),
            audio: Some(MediaAttachment::audio("cough.wav", vec![1, 2, 3, 4])),
            ..CaseDraft::default()
        };
        CaseSubmission::from_draft(&draft, &FormDefaults::mobile()).unwrap()
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/cases")
    }

    /// Echoes the parts it received back inside a valid diagnosis.
    async fn echo_case(mut multipart: Multipart) -> Json<serde_json::Value> {
        let mut parts = HashMap::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);
            let summary = match file_name {
                Some(file) => {
                    let mime = field.content_type().unwrap_or("").to_string();
                    let len = field.bytes().await.unwrap().len();
                    format!("{file}|{mime}|{len}")
                }
                None => field.text().await.unwrap(),
            };
            parts.insert(name, summary);
        }
        Json(serde_json::json!({
            "id": 1,
            "coughDiagnosis": "Bacterial",
            "coughConfidence": 0.87,
            "visualDiagnosis": "Visible Inflammation",
            "finalRecommendation": serde_json::to_string(&parts).unwrap(),
        }))
    }

    #[tokio::test]
    async fn posts_multipart_and_parses_result() {
        let url = serve(Router::new().route("/api/cases", post(echo_case))).await;
        let client = HttpDiagnosisClient::new(&url, Duration::from_secs(5)).unwrap();

        let result = client.submit(submission()).await.unwrap();
        assert_eq!(result.cough_diagnosis, "Bacterial");

        let parts: HashMap<String, String> =
            serde_json::from_str(&result.final_recommendation).unwrap();
        assert_eq!(parts["audio"], "cough.wav|audio/wav|4");
        assert_eq!(parts["image"], "throat.png|image/png|2");
        assert_eq!(parts["patientName"], "Asha");
        assert_eq!(parts["age"], "30");
        assert_eq!(parts["breathingDifficulty"], "No");
        assert!(!parts.contains_key("latitude"));
    }

    #[tokio::test]
    async fn non_success_status_is_server_error() {
        let app = Router::new().route(
            "/api/cases",
            post(|| async { (StatusCode::PAYLOAD_TOO_LARGE, "too big") }),
        );
        let url = serve(app).await;
        let client = HttpDiagnosisClient::new(&url, Duration::from_secs(5)).unwrap();

        let err = client.submit(submission()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Server { status: 413, .. }));
    }

    #[tokio::test]
    async fn malformed_body_fails_closed() {
        let app = Router::new().route(
            "/api/cases",
            post(|| async { Json(serde_json::json!({ "coughDiagnosis": "Viral" })) }),
        );
        let url = serve(app).await;
        let client = HttpDiagnosisClient::new(&url, Duration::from_secs(5)).unwrap();

        let err = client.submit(submission()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Malformed(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let app = Router::new().route(
            "/api/cases",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let url = serve(app).await;
        let client = HttpDiagnosisClient::new(&url, Duration::from_millis(200)).unwrap();

        let err = client.submit(submission()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Timeout(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/api/cases");
        let client = HttpDiagnosisClient::new(&url, Duration::from_secs(2)).unwrap();
        let err = client.submit(submission()).await.unwrap_err();
        assert!(err.is_transport_failure());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client =
            HttpDiagnosisClient::new("http://localhost:8080/api/cases/", Duration::from_secs(20))
                .unwrap();
        assert_eq!(client.cases_url(), "http://localhost:8080/api/cases");
        assert_eq!(client.timeout_secs, 20);
    }

    #[tokio::test]
    async fn mock_records_calls() {
        let mock = MockDiagnosisService::failing();
        assert!(mock.submit(submission()).await.is_err());
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_submission().unwrap().patient_name, "Asha");
    }
}
