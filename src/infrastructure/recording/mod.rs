//! Recording infrastructure module
//!
//! Cross-platform microphone capture using cpal. Finalized captures are
//! encoded to FLAC for lossless, Gemini-compatible uploads; provisional
//! snapshots are encoded to WAV at the device rate.

mod cpal_device;
mod flac_encoder;
mod wav_encoder;

pub use cpal_device::CpalCaptureDevice;
pub use flac_encoder::{encode_to_flac, TARGET_SAMPLE_RATE};
pub use wav_encoder::encode_to_wav;
