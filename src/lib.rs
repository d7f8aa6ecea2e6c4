//! SpeechGuard - hate speech classification for text and live audio
//!
//! This crate provides the core functionality for the classification
//! demo: a native microphone capture client and the inference gateway
//! backing it with Google Gemini.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core business logic, value objects, entities, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, Gemini, gateway client)
//! - **Server**: The inference gateway (axum)
//! - **CLI**: Command-line interface and argument parsing

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod server;
