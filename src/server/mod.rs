//! Inference gateway server
//!
//! Serves the classification API and the demo SPA shell. The gateway is
//! the trust boundary: it validates untrusted client input, talks to
//! the model backend and never forwards malformed model output.

mod error;
mod routes;
mod spa;

pub use error::ApiError;
pub use routes::{router, AppState};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{ClassificationBackend, FileAnalyzer};

/// Options for running the gateway
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Port to listen on
    pub port: u16,
    /// Directory of static demo assets
    pub static_dir: PathBuf,
    /// Allowed CORS origin, or "*" for any
    pub cors_allow_origin: String,
}

/// Errors preventing the gateway from serving
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serve the gateway until interrupted
pub async fn serve(
    options: ServeOptions,
    backend: Arc<dyn ClassificationBackend>,
    analyzer: Arc<dyn FileAnalyzer>,
) -> Result<(), ServeError> {
    let state = AppState {
        backend,
        analyzer,
        static_dir: Arc::new(options.static_dir),
    };

    let app = router(state, &options.cors_allow_origin)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], options.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServeError::Bind {
            port: options.port,
            source: e,
        })?;

    tracing::info!(addr = %addr, "gateway_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown_signal_received"),
        Err(e) => {
            // Without a handler there is no signal to wait for; park
            // instead of shutting the server down immediately
            tracing::error!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    }
}
