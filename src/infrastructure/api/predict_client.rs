//! HTTP client adapter for the inference gateway

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    BackendError, ClassificationBackend, ProvisionalTranscriber, TranscriberError,
};
use crate::domain::audio::AudioPayload;
use crate::domain::classification::{ClassificationRequest, Label, Verdict};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after the initial attempt, transient failures only
const MAX_RETRIES: usize = 2;

/// How many characters of a non-JSON error body are kept
const ERROR_BODY_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
struct PredictRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<AudioBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioBody {
    data: String,
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    label: Option<String>,
    confidence: Option<f64>,
    explanation: Option<String>,
    transcription: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the gateway's predict endpoint.
///
/// Also serves as the live transcript source: a chunk is classified
/// like any other audio and the verdict's transcription field is the
/// provisional transcript.
pub struct HttpPredictClient {
    server_url: String,
    client: reqwest::Client,
}

impl HttpPredictClient {
    /// Create a new client against the given gateway URL
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn predict_url(&self) -> String {
        format!("{}/api/predict", self.server_url)
    }

    fn build_body(request: &ClassificationRequest) -> PredictRequest {
        PredictRequest {
            text: request.text().map(String::from),
            audio: request.audio().map(|audio| AudioBody {
                data: audio.to_base64(),
                mime_type: audio.mime_type().to_string(),
            }),
        }
    }

    /// Turn a non-OK response into an error.
    /// JSON bodies surface their `error` field as-is; anything else
    /// (an HTML error page, plain text) is truncated so a proxy's
    /// error page does not flood the terminal.
    async fn error_from_response(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);

        let message = if is_json {
            match response.json::<ErrorBody>().await {
                Ok(body) => body
                    .error
                    .unwrap_or_else(|| format!("Server Error {}", status)),
                Err(_) => format!("Server Error {}", status),
            }
        } else {
            let text = response.text().await.unwrap_or_default();
            let short: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            format!("Server Error ({}): {}...", status, short)
        };

        BackendError::Upstream { status, message }
    }

    /// Shape a successful response into a verdict.
    /// A response without a usable label degrades to the unclassified
    /// fallback instead of failing the whole submission.
    fn verdict_from_response(response: PredictResponse) -> Verdict {
        let label = match response.label.as_deref().map(str::parse::<Label>) {
            Some(Ok(label)) => label,
            _ => return Verdict::unclassified(),
        };

        let verdict = Verdict::new(
            label,
            response.confidence.unwrap_or(0.0),
            response.explanation.unwrap_or_default(),
        );
        match response.transcription.filter(|t| !t.trim().is_empty()) {
            Some(transcription) => verdict.with_transcription(transcription),
            None => verdict,
        }
    }

    /// One predict round trip
    async fn request_once(&self, body: &PredictRequest) -> Result<PredictResponse, BackendError> {
        let response = self
            .client
            .post(self.predict_url())
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::RequestFailed(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl ClassificationBackend for HttpPredictClient {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, BackendError> {
        let body = Self::build_body(request);

        let response = (|| self.request_once(&body))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(MAX_RETRIES)
                    .with_jitter(),
            )
            .when(BackendError::is_transient)
            .notify(|err: &BackendError, dur: Duration| {
                tracing::warn!(error = %err, retry_in = ?dur, "predict request failed, retrying");
            })
            .await?;

        Ok(Self::verdict_from_response(response))
    }
}

#[async_trait]
impl ProvisionalTranscriber for HttpPredictClient {
    /// Classify a chunk and lift out its transcription. Advisory, so
    /// a single attempt with no retry.
    async fn transcribe_chunk(&self, audio: &AudioPayload) -> Result<String, TranscriberError> {
        let request = ClassificationRequest::from_audio(audio.clone())
            .map_err(|e| TranscriberError::RequestFailed(e.to_string()))?;
        let body = Self::build_body(&request);

        let response = self
            .request_once(&body)
            .await
            .map_err(|e| TranscriberError::RequestFailed(e.to_string()))?;

        match Self::verdict_from_response(response).transcription() {
            Some(text) => Ok(text.to_string()),
            None => Err(TranscriberError::Empty),
        }
    }
}
