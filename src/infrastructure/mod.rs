//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal, the Gemini API and the
//! inference gateway.

pub mod api;
pub mod config;
pub mod gemini;
pub mod recording;

// Re-export adapters
pub use api::HttpPredictClient;
pub use config::XdgConfigStore;
pub use gemini::GeminiBackend;
pub use recording::CpalCaptureDevice;
