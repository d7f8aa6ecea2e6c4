//! Cross-platform microphone capture using cpal
//!
//! Captures mono i16 samples at the device rate and encodes on demand:
//! - finalized captures are resampled to 16kHz and FLAC-encoded
//! - provisional snapshots stay at the device rate as WAV

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::sync::{oneshot, watch};
use tokio::time::Duration as TokioDuration;

use super::flac_encoder::{encode_to_flac, TARGET_SAMPLE_RATE};
use super::wav_encoder::encode_to_wav;
use crate::application::ports::{CaptureDevice, CaptureError};
use crate::domain::audio::{AudioMimeType, AudioPayload};
use crate::domain::capture::PermissionKind;

/// Microphone capture device backed by cpal
///
/// cpal::Stream is not Send, so the stream lives on a dedicated thread
/// for the whole capture. The struct holds only the state shared
/// between that thread and the async side.
pub struct CpalCaptureDevice {
    /// Captured audio samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Device sample rate (may differ from the 16kHz encoding target)
    device_sample_rate: Arc<AtomicU32>,
    /// Capture state flag, doubles as the stop signal for the thread
    is_recording: Arc<AtomicBool>,
    /// Elapsed capture time in milliseconds
    elapsed_ms: Arc<AtomicU64>,
    /// Input level publisher (RMS per callback chunk, 0.0 to 1.0)
    level_tx: Arc<watch::Sender<f32>>,
    level_rx: watch::Receiver<f32>,
}

impl CpalCaptureDevice {
    /// Create a new cpal-backed capture device
    pub fn new() -> Self {
        let (level_tx, level_rx) = watch::channel(0.0f32);
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            is_recording: Arc::new(AtomicBool::new(false)),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            level_tx: Arc::new(level_tx),
            level_rx,
        }
    }

    /// The MIME type finalized captures are encoded as
    pub fn capture_mime() -> AudioMimeType {
        AudioMimeType::negotiate(&[AudioMimeType::Flac, AudioMimeType::Wav], AudioMimeType::Flac)
    }

    /// Map a device-open failure onto a permission error
    ///
    /// cpal surfaces OS errors as strings, so the kind is recovered by
    /// substring. Anything unrecognized stays `Unknown` rather than
    /// guessing.
    fn classify_open_failure(message: &str) -> CaptureError {
        let lowered = message.to_lowercase();
        let kind = if lowered.contains("permission")
            || lowered.contains("access denied")
            || lowered.contains("not permitted")
        {
            PermissionKind::Denied
        } else if lowered.contains("busy") || lowered.contains("in use") {
            PermissionKind::DeviceBusy
        } else if lowered.contains("no device")
            || lowered.contains("not found")
            || lowered.contains("unavailable")
            || lowered.contains("disconnected")
        {
            PermissionKind::DeviceNotFound
        } else {
            PermissionKind::Unknown
        };

        CaptureError::Permission {
            kind,
            reason: message.to_string(),
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or_else(|| CaptureError::Permission {
                kind: PermissionKind::DeviceNotFound,
                reason: "No default input device".to_string(),
            })
    }

    /// Get a suitable input configuration
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| Self::classify_open_failure(&e.to_string()))?;

        // Try to find a config that supports the target sample rate.
        // Prefer mono, but accept stereo (mixed down in the callback).
        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            // Only consider i16 or f32 formats
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            // Prefer configs that include 16kHz
            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    // Prefer mono over stereo
                    let fewer_channels = config.channels() < current.channels();
                    // Prefer configs that include the target rate
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or_else(|| {
            Self::classify_open_failure("No usable input configuration on the default device")
        })?;

        // Use the target sample rate if supported, otherwise the minimum
        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Resample audio from the device rate to 16kHz if needed
    fn resample_to_16k(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, CaptureError> {
        if source_rate == TARGET_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        // Convert i16 to f32 for resampling
        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| CaptureError::CaptureFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());
            let chunk: Vec<Vec<f32>> = vec![samples_f32[input_pos..end_pos].to_vec()];

            // Pad the final partial chunk
            let chunk = if chunk[0].len() < frames_needed {
                let mut padded = chunk[0].clone();
                padded.resize(frames_needed, 0.0);
                vec![padded]
            } else {
                chunk
            };

            let resampled = resampler
                .process(&chunk, None)
                .map_err(|e| CaptureError::CaptureFailed(format!("Resampling failed: {}", e)))?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        // Trim the resampler's padding back off
        output.truncate(output_len);

        Ok(output)
    }

    /// Mix stereo to mono
    fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// RMS of a sample chunk, normalized to 0.0..=1.0
    fn rms_level(samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (sum_squares / samples.len() as f64).sqrt();
        (rms / 32768.0).min(1.0) as f32
    }

    /// Resample to 16kHz and encode the finished capture to FLAC
    fn finalize_capture(samples: &[i16], sample_rate: u32) -> Result<AudioPayload, CaptureError> {
        let duration_ms = samples.len() as u64 * 1000 / sample_rate.max(1) as u64;

        let resampled = Self::resample_to_16k(samples, sample_rate)?;
        let flac_data = encode_to_flac(&resampled)
            .map_err(|e| CaptureError::CaptureFailed(format!("FLAC encoding failed: {}", e)))?;

        if flac_data.is_empty() {
            return Err(CaptureError::CaptureFailed(
                "Encoded audio is empty".to_string(),
            ));
        }

        Ok(AudioPayload::new(flac_data, Self::capture_mime(), duration_ms))
    }
}

impl Default for CpalCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CpalCaptureDevice {
    fn drop(&mut self) {
        // Signals the capture thread to release the stream and exit
        self.is_recording.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    async fn start(&self) -> Result<(), CaptureError> {
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::StartFailed(
                "Capture already in progress".to_string(),
            ));
        }

        // Clear any leftovers from a previous capture
        {
            let mut buffer = self.audio_buffer.lock().unwrap();
            buffer.clear();
        }
        self.elapsed_ms.store(0, Ordering::SeqCst);
        let _ = self.level_tx.send(0.0);

        // The callbacks gate on this flag, so it goes up before the
        // stream opens
        self.is_recording.store(true, Ordering::SeqCst);

        // The thread reports the outcome of opening the device through
        // this channel, then owns the stream until the flag drops
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), CaptureError>>();

        let audio_buffer = Arc::clone(&self.audio_buffer);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let is_recording = Arc::clone(&self.is_recording);
        let elapsed_ms = Arc::clone(&self.elapsed_ms);
        let level_tx = Arc::clone(&self.level_tx);

        std::thread::spawn(move || {
            let device = match CpalCaptureDevice::get_input_device() {
                Ok(d) => d,
                Err(e) => {
                    is_recording.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let (config, sample_format) = match CpalCaptureDevice::get_input_config(&device) {
                Ok(c) => c,
                Err(e) => {
                    is_recording.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let sample_rate = config.sample_rate.0;
            let channels = config.channels;
            device_sample_rate.store(sample_rate, Ordering::SeqCst);

            let audio_buffer_clone = Arc::clone(&audio_buffer);
            let is_recording_clone = Arc::clone(&is_recording);
            let level_tx_clone = Arc::clone(&level_tx);

            let stream_result = match sample_format {
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if is_recording_clone.load(Ordering::SeqCst) {
                            let mono = CpalCaptureDevice::stereo_to_mono(data, channels);
                            let _ = level_tx_clone.send(CpalCaptureDevice::rms_level(&mono));
                            if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    |err| tracing::warn!(error = %err, "audio stream error"),
                    None,
                ),

                SampleFormat::F32 => {
                    let audio_buffer_clone = Arc::clone(&audio_buffer);
                    let is_recording_clone = Arc::clone(&is_recording);
                    let level_tx_clone = Arc::clone(&level_tx);

                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if is_recording_clone.load(Ordering::SeqCst) {
                                let i16_data: Vec<i16> =
                                    data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                let mono = CpalCaptureDevice::stereo_to_mono(&i16_data, channels);
                                let _ = level_tx_clone.send(CpalCaptureDevice::rms_level(&mono));
                                if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            }
                        },
                        |err| tracing::warn!(error = %err, "audio stream error"),
                        None,
                    )
                }

                other => {
                    is_recording.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(CaptureError::StartFailed(format!(
                        "Unsupported sample format: {:?}",
                        other
                    ))));
                    return;
                }
            };

            let stream = match stream_result {
                Ok(s) => s,
                Err(e) => {
                    is_recording.store(false, Ordering::SeqCst);
                    let _ = ready_tx.send(Err(CpalCaptureDevice::classify_open_failure(
                        &e.to_string(),
                    )));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                is_recording.store(false, Ordering::SeqCst);
                let _ = ready_tx.send(Err(CpalCaptureDevice::classify_open_failure(
                    &e.to_string(),
                )));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            // Keep the stream alive until stopped
            let start = Instant::now();
            while is_recording.load(Ordering::SeqCst) {
                elapsed_ms.store(start.elapsed().as_millis() as u64, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(100));
            }

            drop(stream);
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                self.is_recording.store(false, Ordering::SeqCst);
                Err(CaptureError::StartFailed(
                    "Capture thread exited before the stream opened".to_string(),
                ))
            }
        }
    }

    async fn stop(&self) -> Result<AudioPayload, CaptureError> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::NotRecording);
        }

        // Drop the flag, then give the thread a moment to release the
        // stream so no callback runs after the buffer is taken
        self.is_recording.store(false, Ordering::SeqCst);
        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(CaptureError::CaptureFailed(
                "Device sample rate was never reported".to_string(),
            ));
        }

        let samples = {
            let mut buffer = self.audio_buffer.lock().unwrap();
            std::mem::take(&mut *buffer)
        };

        self.elapsed_ms.store(0, Ordering::SeqCst);
        let _ = self.level_tx.send(0.0);

        if samples.is_empty() {
            return Err(CaptureError::EmptyCapture);
        }

        // Resampling and FLAC encoding are CPU-bound
        let encoded =
            tokio::task::spawn_blocking(move || Self::finalize_capture(&samples, sample_rate))
                .await
                .map_err(|e| CaptureError::CaptureFailed(format!("Encode task error: {}", e)))??;

        Ok(encoded)
    }

    async fn cancel(&self) -> Result<(), CaptureError> {
        self.is_recording.store(false, Ordering::SeqCst);

        // Give the thread a moment to release the stream
        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        {
            let mut buffer = self.audio_buffer.lock().unwrap();
            buffer.clear();
        }
        self.elapsed_ms.store(0, Ordering::SeqCst);
        let _ = self.level_tx.send(0.0);

        Ok(())
    }

    async fn snapshot(&self) -> Result<AudioPayload, CaptureError> {
        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::NotRecording);
        }

        // Clone rather than drain, the capture keeps accumulating
        let samples = {
            let buffer = self.audio_buffer.lock().unwrap();
            buffer.clone()
        };

        if samples.is_empty() {
            return Ok(AudioPayload::new(Vec::new(), AudioMimeType::Wav, 0));
        }

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(CaptureError::CaptureFailed(
                "Device sample rate was never reported".to_string(),
            ));
        }

        let duration_ms = samples.len() as u64 * 1000 / sample_rate as u64;

        let wav_data = tokio::task::spawn_blocking(move || encode_to_wav(&samples, sample_rate))
            .await
            .map_err(|e| CaptureError::CaptureFailed(format!("Encode task error: {}", e)))?
            .map_err(|e| CaptureError::CaptureFailed(format!("WAV encoding failed: {}", e)))?;

        Ok(AudioPayload::new(wav_data, AudioMimeType::Wav, duration_ms))
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms.load(Ordering::SeqCst)
    }

    fn level_feed(&self) -> watch::Receiver<f32> {
        self.level_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_to_mono_single_channel() {
        let mono = vec![100i16, 200, 300];
        let result = CpalCaptureDevice::stereo_to_mono(&mono, 1);
        assert_eq!(result, mono);
    }

    #[test]
    fn stereo_to_mono_two_channels() {
        let stereo = vec![100i16, 200, 300, 400];
        let result = CpalCaptureDevice::stereo_to_mono(&stereo, 2);
        assert_eq!(result, vec![150, 350]); // Average of each pair
    }

    #[test]
    fn device_default_state() {
        let device = CpalCaptureDevice::new();
        assert!(!device.is_recording());
        assert_eq!(device.elapsed_ms(), 0);
        assert_eq!(*device.level_feed().borrow(), 0.0);
    }

    #[test]
    fn rms_level_of_silence_is_zero() {
        assert_eq!(CpalCaptureDevice::rms_level(&[0i16; 64]), 0.0);
    }

    #[test]
    fn rms_level_of_full_scale_is_near_one() {
        let loud = vec![i16::MIN; 64];
        let level = CpalCaptureDevice::rms_level(&loud);
        assert!(level > 0.99 && level <= 1.0);
    }

    #[test]
    fn open_failure_classified_as_denied() {
        let err = CpalCaptureDevice::classify_open_failure("Operation not permitted");
        assert_eq!(err.permission_kind(), Some(PermissionKind::Denied));
    }

    #[test]
    fn open_failure_classified_as_busy() {
        let err = CpalCaptureDevice::classify_open_failure("Device or resource busy");
        assert_eq!(err.permission_kind(), Some(PermissionKind::DeviceBusy));
    }

    #[test]
    fn open_failure_classified_as_not_found() {
        let err = CpalCaptureDevice::classify_open_failure("The requested device is not found");
        assert_eq!(err.permission_kind(), Some(PermissionKind::DeviceNotFound));
    }

    #[test]
    fn open_failure_without_match_is_unknown() {
        let err = CpalCaptureDevice::classify_open_failure("kAudioHardwareUnspecifiedError");
        assert_eq!(err.permission_kind(), Some(PermissionKind::Unknown));
    }

    #[test]
    fn finalized_captures_are_flac() {
        assert_eq!(CpalCaptureDevice::capture_mime(), AudioMimeType::Flac);
    }
}
