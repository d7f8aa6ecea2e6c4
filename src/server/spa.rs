//! Static demo shell serving

use std::path::Path;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use super::error::ApiError;
use super::routes::AppState;

/// Serve static assets, falling back to the app shell for page routes
///
/// Extension-less paths outside `/api` get `index.html` so client-side
/// routing survives a refresh. Asset paths with an extension 404 when
/// the file is missing.
pub async fn spa_fallback(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();

    if path == "/api" || path.starts_with("/api/") {
        return Err(ApiError::NotFound(format!("No such endpoint: {}", path)));
    }

    let is_page_route = Path::new(&path).extension().is_none();

    let response = match ServeDir::new(state.static_dir.as_ref()).oneshot(request).await {
        Ok(res) => res.map(Body::new),
        Err(infallible) => match infallible {},
    };

    if response.status() != StatusCode::NOT_FOUND || !is_page_route {
        return Ok(response);
    }

    let shell = state.static_dir.join("index.html");
    let response = match ServeFile::new(shell).oneshot(Request::new(Body::empty())).await {
        Ok(res) => res.map(Body::new),
        Err(infallible) => match infallible {},
    };

    Ok(response)
}
