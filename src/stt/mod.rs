//! Upstream speech-recognition stream.
//!
//! The bridge forwards caller audio to a vendor's realtime endpoint and
//! receives partial/final transcript results back. `SpeechStream` is
//! the seam: the session logic only sees normalized `TranscriptEvent`s,
//! whatever vendor is behind it.

pub mod deepgram;
pub mod messages;

pub use deepgram::DeepgramStream;

use crate::bridge::protocol::StreamFormat;
use crate::config::TranscriberConfig;
use anyhow::{Context, Result};
use tokio::sync::mpsc;

/// Normalized transcript result from the speech vendor.
#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    /// Which interleaved audio channel this result belongs to
    pub channel_index: usize,
    /// Transcribed text (may be empty for silence)
    pub text: String,
    /// Vendor confidence (0.0 to 1.0), if reported
    pub confidence: Option<f32>,
    /// Whether this result will not be revised further
    pub is_final: bool,
    /// Whether the vendor detected the end of the utterance
    pub speech_final: bool,
}

/// Streaming speech-to-text connection
///
/// Lifecycle: `start` opens the vendor connection and yields the result
/// channel, `send_audio` forwards raw PCM, `finish` signals end of
/// audio and waits for the vendor to drain.
#[async_trait::async_trait]
pub trait SpeechStream: Send {
    /// Open the vendor connection
    ///
    /// Returns a channel receiver that will receive transcript events
    async fn start(&mut self) -> Result<mpsc::Receiver<TranscriptEvent>>;

    /// Forward a frame of raw PCM audio to the vendor
    async fn send_audio(&mut self, pcm: &[u8]) -> Result<()>;

    /// Signal end of audio and wait for remaining results
    async fn finish(&mut self) -> Result<()>;

    /// Vendor name for logging
    fn name(&self) -> &str;
}

/// Opens a vendor stream for a session's negotiated audio format.
///
/// Sessions go through this seam instead of a concrete client, so a
/// scripted vendor can stand in during tests.
pub trait SpeechStreamProvider: Send + Sync {
    fn open(&self, config: &TranscriberConfig, format: &StreamFormat)
        -> Result<Box<dyn SpeechStream>>;
}

/// Speech stream factory
pub struct SpeechStreamFactory;

impl SpeechStreamFactory {
    /// Create a vendor stream for the negotiated audio format.
    ///
    /// The API key is resolved from the environment variable named in
    /// the configuration, never from the config file itself.
    pub fn create(
        config: &TranscriberConfig,
        format: &StreamFormat,
    ) -> Result<Box<dyn SpeechStream>> {
        let api_key = std::env::var(&config.api_key_env).with_context(|| {
            format!(
                "Speech vendor API key not found in environment variable {}",
                config.api_key_env
            )
        })?;

        Ok(Box::new(DeepgramStream::new(
            config.clone(),
            format.clone(),
            api_key,
        )))
    }
}

impl SpeechStreamProvider for SpeechStreamFactory {
    fn open(
        &self,
        config: &TranscriberConfig,
        format: &StreamFormat,
    ) -> Result<Box<dyn SpeechStream>> {
        Self::create(config, format)
    }
}
