//! Gateway HTTP client adapters

mod predict_client;

pub use predict_client::HttpPredictClient;
