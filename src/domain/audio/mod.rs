//! Audio domain: MIME negotiation and encoded payloads

mod mime;
mod payload;

pub use mime::AudioMimeType;
pub use payload::AudioPayload;
