//! Live transcript bridge
//!
//! A background task that periodically snapshots the in-progress
//! capture and transcribes it. Output is advisory only; chunk
//! failures are logged and skipped, and the final classification
//! never depends on anything produced here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ports::{CaptureDevice, ProvisionalTranscriber};

/// Handle to the background transcription task
pub struct TranscriptionBridge {
    stop_tx: watch::Sender<bool>,
    transcript_rx: watch::Receiver<String>,
    handle: JoinHandle<()>,
}

impl TranscriptionBridge {
    /// Spawn the bridge task against a capturing device.
    /// Each tick snapshots the capture so far and replaces the
    /// published transcript with the newest result.
    pub fn spawn<D, P>(device: Arc<D>, transcriber: Arc<P>, interval: Duration) -> Self
    where
        D: CaptureDevice + 'static,
        P: ProvisionalTranscriber + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (transcript_tx, transcript_rx) = watch::channel(String::new());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the
            // first chunk carries a full interval of audio.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let audio = match device.snapshot().await {
                            Ok(audio) => audio,
                            Err(err) => {
                                tracing::warn!(error = %err, "live transcript snapshot failed, skipping chunk");
                                continue;
                            }
                        };
                        if audio.is_empty() {
                            continue;
                        }
                        match transcriber.transcribe_chunk(&audio).await {
                            Ok(text) if !text.trim().is_empty() => {
                                let _ = transcript_tx.send(text);
                            }
                            Ok(_) => {}
                            Err(err) => {
                                tracing::warn!(error = %err, "live transcript chunk failed, skipping");
                            }
                        }
                    }
                }
            }
        });

        Self {
            stop_tx,
            transcript_rx,
            handle,
        }
    }

    /// Subscribe to transcript updates
    pub fn transcript_feed(&self) -> watch::Receiver<String> {
        self.transcript_rx.clone()
    }

    /// Stop the task, wait for it to finish, and return the last
    /// transcript it published (if any).
    pub async fn shutdown(self) -> Option<String> {
        let Self {
            stop_tx,
            transcript_rx,
            handle,
        } = self;

        let _ = stop_tx.send(true);
        let _ = handle.await;

        let last = transcript_rx.borrow().clone();
        if last.is_empty() {
            None
        } else {
            Some(last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{CaptureError, TranscriberError};
    use crate::domain::audio::{AudioMimeType, AudioPayload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SnapshotDevice {
        snapshots: AtomicUsize,
    }

    impl SnapshotDevice {
        fn new() -> Self {
            Self {
                snapshots: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CaptureDevice for SnapshotDevice {
        async fn start(&self) -> Result<(), CaptureError> {
            Ok(())
        }

        async fn stop(&self) -> Result<AudioPayload, CaptureError> {
            Ok(AudioPayload::new(vec![0u8; 16], AudioMimeType::Wav, 1000))
        }

        async fn cancel(&self) -> Result<(), CaptureError> {
            Ok(())
        }

        async fn snapshot(&self) -> Result<AudioPayload, CaptureError> {
            let n = self.snapshots.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AudioPayload::new(vec![0u8; n], AudioMimeType::Wav, n as u64 * 100))
        }

        fn is_recording(&self) -> bool {
            true
        }

        fn elapsed_ms(&self) -> u64 {
            0
        }

        fn level_feed(&self) -> watch::Receiver<f32> {
            watch::channel(0.0).1
        }
    }

    struct CountingTranscriber {
        calls: AtomicUsize,
    }

    impl CountingTranscriber {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProvisionalTranscriber for CountingTranscriber {
        async fn transcribe_chunk(&self, audio: &AudioPayload) -> Result<String, TranscriberError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("chunk {} ({} bytes)", n, audio.data().len()))
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl ProvisionalTranscriber for FailingTranscriber {
        async fn transcribe_chunk(&self, _audio: &AudioPayload) -> Result<String, TranscriberError> {
            Err(TranscriberError::RequestFailed("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn bridge_publishes_newest_transcript() {
        let device = Arc::new(SnapshotDevice::new());
        let transcriber = Arc::new(CountingTranscriber::new());

        let bridge = TranscriptionBridge::spawn(
            device.clone(),
            transcriber.clone(),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(110)).await;

        let last = bridge.shutdown().await.unwrap();
        assert!(last.starts_with("chunk"));
        assert!(transcriber.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn shutdown_before_first_tick_yields_nothing() {
        let device = Arc::new(SnapshotDevice::new());
        let transcriber = Arc::new(CountingTranscriber::new());

        let bridge =
            TranscriptionBridge::spawn(device, transcriber, Duration::from_secs(3600));

        assert!(bridge.shutdown().await.is_none());
    }

    #[tokio::test]
    async fn chunk_failures_are_skipped() {
        let device = Arc::new(SnapshotDevice::new());

        let bridge = TranscriptionBridge::spawn(
            device,
            Arc::new(FailingTranscriber),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(90)).await;

        assert!(bridge.shutdown().await.is_none());
    }
}
