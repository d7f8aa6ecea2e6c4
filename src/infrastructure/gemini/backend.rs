//! Gemini API classification adapter

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    BackendError, ClassificationBackend, FileAnalysis, FileAnalyzer,
};
use crate::domain::audio::AudioPayload;
use crate::domain::classification::{ClassificationRequest, Label, ModelInstruction, Verdict};
use crate::domain::config::DEFAULT_MODEL;

/// Gemini API base URL
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Model used for transcript embeddings
const EMBEDDING_MODEL: &str = "text-embedding-004";

/// Per-request timeout; audio uploads can be slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Retries after the initial attempt, transient failures only
const MAX_RETRIES: usize = 2;

// Request types for Gemini API

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Option<SystemInstruction>,
    generation_config: Option<GenerationConfig>,
    safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<TextPart>,
}

// Response types for Gemini API

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<Embedding>,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

/// Structured verdict as the model emits it, before validation
#[derive(Debug, Deserialize)]
struct VerdictWire {
    label: Option<String>,
    confidence: Option<f64>,
    explanation: Option<String>,
    transcription: Option<String>,
}

/// Structured analysis as the model emits it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisWire {
    transcription: Option<String>,
    summary: Option<String>,
    intent: Option<String>,
    key_points: Option<Vec<String>>,
}

/// Gemini API classification backend
pub struct GeminiBackend {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create a new Gemini backend with a custom model
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (used against a stub server in tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the generateContent URL
    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Build the embedContent URL
    fn embed_url(&self) -> String {
        format!(
            "{}/{}:embedContent?key={}",
            self.base_url, EMBEDDING_MODEL, self.api_key
        )
    }

    /// The response schema for a classification verdict
    fn verdict_schema() -> serde_json::Value {
        let labels: Vec<&str> = Label::ALL.iter().map(|label| label.as_str()).collect();
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "label": { "type": "STRING", "enum": labels },
                "confidence": { "type": "NUMBER" },
                "explanation": { "type": "STRING" },
                "transcription": { "type": "STRING" },
            },
            "required": ["label", "confidence", "explanation"],
        })
    }

    /// The response schema for a file analysis
    fn analysis_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "transcription": { "type": "STRING" },
                "summary": { "type": "STRING" },
                "intent": { "type": "STRING" },
                "keyPoints": { "type": "ARRAY", "items": { "type": "STRING" } },
            },
            "required": ["transcription", "summary", "intent", "keyPoints"],
        })
    }

    /// Safety settings for classification requests.
    /// The input under test is exactly what the default filters would
    /// block, so every category is set to BLOCK_NONE.
    fn permissive_safety() -> Vec<SafetySetting> {
        [
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category: category.to_string(),
            threshold: "BLOCK_NONE".to_string(),
        })
        .collect()
    }

    /// Build the request body for a classification
    fn build_request(&self, request: &ClassificationRequest) -> GenerateContentRequest {
        let mut parts = Vec::new();
        if let Some(text) = request.text() {
            parts.push(Part {
                text: Some(text.to_string()),
                inline_data: None,
            });
        }
        if let Some(audio) = request.audio() {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: audio.mime_type().to_string(),
                    data: audio.to_base64(),
                }),
            });
        }

        let instruction = if request.has_audio() {
            ModelInstruction::for_audio()
        } else {
            ModelInstruction::for_text()
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![TextPart {
                    text: instruction.text().to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Self::verdict_schema(),
            }),
            safety_settings: Some(Self::permissive_safety()),
        }
    }

    /// Build the request body for a file analysis
    fn build_analysis_request(&self, audio: &AudioPayload) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: audio.mime_type().to_string(),
                        data: audio.to_base64(),
                    }),
                }],
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![TextPart {
                    text: ModelInstruction::for_file_analysis().text().to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Self::analysis_schema(),
            }),
            safety_settings: Some(Self::permissive_safety()),
        }
    }

    /// One generateContent round trip with status mapping
    async fn request_once(
        &self,
        url: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, BackendError> {
        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::InvalidApiKey);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::RequestFailed(format!("invalid response body: {}", e)))
    }

    /// generateContent with bounded retry on transient failures
    async fn request_with_retry(
        &self,
        url: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, BackendError> {
        let response = (|| self.request_once(url, body))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(MAX_RETRIES)
                    .with_jitter(),
            )
            .when(BackendError::is_transient)
            .notify(|err: &BackendError, dur: Duration| {
                tracing::warn!(error = %err, retry_in = ?dur, "Gemini request failed, retrying");
            })
            .await?;

        if let Some(error) = response.error {
            return Err(BackendError::Api(error.message));
        }

        Ok(response)
    }

    /// Extract the joined text of the first candidate
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let parts: Vec<&str> = response
            .candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(""))
        }
    }

    /// Validate a structured model verdict.
    /// Every required field must be present and the label must be one
    /// of the known three; nothing is patched up here.
    fn parse_verdict(text: &str) -> Result<Verdict, BackendError> {
        let wire: VerdictWire = serde_json::from_str(text)
            .map_err(|e| BackendError::IncompleteResponse(format!("not valid JSON: {}", e)))?;

        let label = wire
            .label
            .ok_or_else(|| BackendError::IncompleteResponse("label".to_string()))?;
        let label: Label = label
            .parse()
            .map_err(|_| BackendError::IncompleteResponse(format!("unknown label \"{}\"", label)))?;
        let confidence = wire
            .confidence
            .ok_or_else(|| BackendError::IncompleteResponse("confidence".to_string()))?;
        let explanation = wire
            .explanation
            .ok_or_else(|| BackendError::IncompleteResponse("explanation".to_string()))?;

        let verdict = Verdict::new(label, confidence, explanation);
        Ok(match wire.transcription.filter(|t| !t.trim().is_empty()) {
            Some(transcription) => verdict.with_transcription(transcription),
            None => verdict,
        })
    }

    /// Fetch an embedding for the transcript text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let body = EmbedContentRequest {
            model: format!("models/{}", EMBEDDING_MODEL),
            content: EmbedContent {
                parts: vec![TextPart {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(self.embed_url())
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::RequestFailed(format!("invalid response body: {}", e)))?;

        Ok(parsed.embedding.map(|e| e.values).unwrap_or_default())
    }
}

#[async_trait]
impl ClassificationBackend for GeminiBackend {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, BackendError> {
        let url = self.api_url();
        let body = self.build_request(request);

        let response = self.request_with_retry(&url, &body).await?;
        let text = Self::extract_text(&response).ok_or(BackendError::EmptyResponse)?;

        Self::parse_verdict(&text)
    }
}

#[async_trait]
impl FileAnalyzer for GeminiBackend {
    async fn analyze(&self, audio: &AudioPayload) -> Result<FileAnalysis, BackendError> {
        let url = self.api_url();
        let body = self.build_analysis_request(audio);

        let response = self.request_with_retry(&url, &body).await?;
        let text = Self::extract_text(&response).ok_or(BackendError::EmptyResponse)?;

        let wire: AnalysisWire = serde_json::from_str(&text)
            .map_err(|e| BackendError::IncompleteResponse(format!("not valid JSON: {}", e)))?;
        let transcription = wire
            .transcription
            .ok_or_else(|| BackendError::IncompleteResponse("transcription".to_string()))?;
        let summary = wire
            .summary
            .ok_or_else(|| BackendError::IncompleteResponse("summary".to_string()))?;
        let intent = wire
            .intent
            .ok_or_else(|| BackendError::IncompleteResponse("intent".to_string()))?;
        let key_points = wire.key_points.unwrap_or_default();

        let embedding = self.embed(&transcription).await?;

        Ok(FileAnalysis {
            transcription,
            summary,
            intent,
            key_points,
            embedding,
        })
    }
}
