//! Configuration domain

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_CORS_ORIGIN, DEFAULT_MIN_CAPTURE_MS, DEFAULT_MODEL, DEFAULT_PORT,
    DEFAULT_SERVER_URL, DEFAULT_STATIC_DIR,
};
