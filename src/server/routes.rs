//! Gateway API routes

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::spa::spa_fallback;
use super::ServeError;
use crate::application::ports::{ClassificationBackend, FileAnalyzer};
use crate::domain::audio::{AudioMimeType, AudioPayload};
use crate::domain::classification::{ClassificationRequest, Verdict};

/// Shared state for the gateway routes
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ClassificationBackend>,
    pub analyzer: Arc<dyn FileAnalyzer>,
    pub static_dir: Arc<PathBuf>,
}

/// Request body for `POST /api/predict`
#[derive(Debug, Deserialize)]
pub struct PredictBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio: Option<AudioBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AudioBody {
    data: String,
    mime_type: String,
}

/// Request body for `POST /api/analyze-file`
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    audio: AnalyzeAudioBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeAudioBody {
    data: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    transcription: String,
    summary: String,
    intent: String,
    key_points: Vec<String>,
    embedding: Vec<f32>,
}

/// Build the gateway router
pub fn router(state: AppState, cors_allow_origin: &str) -> Result<Router, ServeError> {
    let cors = cors_layer(cors_allow_origin)?;

    Ok(Router::new()
        .route("/api/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/analyze-file", post(analyze_file))
        .fallback(spa_fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allow_origin: &str) -> Result<CorsLayer, ServeError> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allow_origin == "*" {
        return Ok(cors.allow_origin(Any));
    }

    let origin = allow_origin
        .parse::<HeaderValue>()
        .map_err(|_| ServeError::InvalidCorsOrigin(allow_origin.to_string()))?;

    Ok(cors.allow_origin(origin))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictBody>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError> {
    let Json(body) = body.map_err(bad_json)?;

    let audio = match body.audio {
        Some(audio) => Some(decode_audio(&audio.data, &audio.mime_type)?),
        None => None,
    };

    let request = ClassificationRequest::new(body.text.as_deref(), audio)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let verdict = state.backend.classify(&request).await?;
    Ok(Json(verdict))
}

async fn analyze_file(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(body) = body.map_err(bad_json)?;

    // Browser uploads may arrive without a detected type
    let mime = body
        .audio
        .mime_type
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "audio/mp3".to_string());

    let payload = decode_audio(&body.audio.data, &mime)?;
    let analysis = state.analyzer.analyze(&payload).await?;

    Ok(Json(AnalyzeResponse {
        transcription: analysis.transcription,
        summary: analysis.summary,
        intent: analysis.intent,
        key_points: analysis.key_points,
        embedding: analysis.embedding,
    }))
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidRequest(format!("Malformed JSON body: {}", rejection.body_text()))
}

fn decode_audio(data: &str, mime: &str) -> Result<AudioPayload, ApiError> {
    let mime_type = mime
        .parse::<AudioMimeType>()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(data.as_bytes())
        .map_err(|_| ApiError::InvalidRequest("Audio data is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(ApiError::InvalidRequest("Audio data is empty".to_string()));
    }

    // Duration is unknown on this side of the wire
    Ok(AudioPayload::new(bytes, mime_type, 0))
}
