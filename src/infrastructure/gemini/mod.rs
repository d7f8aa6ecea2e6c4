//! Gemini API adapters

mod backend;

pub use backend::GeminiBackend;
