//! In-memory WAV encoder for live transcript chunks
//!
//! Chunks are throwaway uploads, so they stay at the device sample
//! rate and skip the resampling pass the finalized capture gets.

use std::io::Cursor;

/// Encode mono i16 samples to a WAV container at the given rate
pub fn encode_to_wav(pcm_samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, WavEncodeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| WavEncodeError::Write(e.to_string()))?;

    for &sample in pcm_samples {
        writer
            .write_sample(sample)
            .map_err(|e| WavEncodeError::Write(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| WavEncodeError::Write(e.to_string()))?;

    Ok(cursor.into_inner())
}

/// WAV encoding errors
#[derive(Debug, thiserror::Error)]
pub enum WavEncodeError {
    #[error("WAV write failed: {0}")]
    Write(String),
}
