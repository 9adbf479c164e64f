use super::protocol::{Channel, InboundMessage, StreamFormat, TranscriberResponse};
use super::stats::SessionStats;
use crate::audio::{pcm, SessionRecorder};
use crate::config::Config;
use crate::stt::{SpeechStream, SpeechStreamFactory, SpeechStreamProvider, TranscriptEvent};
use crate::transcript::{ChannelAggregator, Utterance};
use anyhow::{bail, Context, Result};
use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// How long the caller gets to send its start message
const START_TIMEOUT: Duration = Duration::from_secs(10);

/// How often buffered finals are checked against the debounce window
const SWEEP_INTERVAL: Duration = Duration::from_millis(250);

/// One caller connection bridged to one vendor stream.
///
/// The session relays binary PCM from the caller to the vendor, runs
/// the vendor's results through the per-channel aggregator, and sends
/// completed utterances back to the caller as transcriber responses.
pub struct BridgeSession {
    /// Session identifier (also used for the recording filename)
    session_id: String,

    /// Service configuration
    config: Arc<Config>,

    /// Opens the upstream vendor stream
    provider: Arc<dyn SpeechStreamProvider>,

    /// When the caller connected
    started_at: chrono::DateTime<chrono::Utc>,

    /// Whether the caller socket is currently open
    live: Arc<AtomicBool>,

    /// Audio format from the start message
    format: Arc<Mutex<Option<StreamFormat>>>,

    /// Bytes of caller audio forwarded to the vendor
    audio_bytes: Arc<AtomicUsize>,

    /// Transcript events received from the vendor
    vendor_events: Arc<AtomicUsize>,

    /// Utterances emitted per call leg
    customer_utterances: Arc<AtomicUsize>,
    assistant_utterances: Arc<AtomicUsize>,
}

impl BridgeSession {
    pub fn new(session_id: String, config: Arc<Config>) -> Self {
        Self::with_provider(session_id, config, Arc::new(SpeechStreamFactory))
    }

    pub fn with_provider(
        session_id: String,
        config: Arc<Config>,
        provider: Arc<dyn SpeechStreamProvider>,
    ) -> Self {
        Self {
            session_id,
            config,
            provider,
            started_at: Utc::now(),
            live: Arc::new(AtomicBool::new(false)),
            format: Arc::new(Mutex::new(None)),
            audio_bytes: Arc::new(AtomicUsize::new(0)),
            vendor_events: Arc::new(AtomicUsize::new(0)),
            customer_utterances: Arc::new(AtomicUsize::new(0)),
            assistant_utterances: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Drive the session to completion. Returns when the caller hangs
    /// up and all pending transcripts have been delivered.
    pub async fn run(&self, socket: WebSocket) -> Result<()> {
        let (mut sink, mut stream) = socket.split();

        let format = match self.await_start(&mut stream).await {
            Ok(format) => format,
            Err(e) => {
                let _ = sink.send(Message::Close(None)).await;
                return Err(e);
            }
        };

        info!(
            "Session {} started: {} {}ch @ {}Hz",
            self.session_id, format.encoding, format.channels, format.sample_rate
        );

        if format.encoding != "linear16" {
            warn!(
                "Caller declared encoding {:?}; only linear16 is known to work",
                format.encoding
            );
        }

        {
            let mut slot = self.format.lock().await;
            *slot = Some(format.clone());
        }

        // Open the vendor stream before accepting any audio
        let mut vendor_stream = match self.open_vendor(&format) {
            Ok(vendor) => vendor,
            Err(e) => {
                error!("Session {}: {:#}", self.session_id, e);
                let _ = sink.send(Message::Close(None)).await;
                return Err(e);
            }
        };

        let events = match vendor_stream.start().await {
            Ok(events) => events,
            Err(e) => {
                error!("Session {}: {:#}", self.session_id, e);
                let _ = sink.send(Message::Close(None)).await;
                return Err(e);
            }
        };

        debug!(
            "Session {}: {} stream open",
            self.session_id,
            vendor_stream.name()
        );

        let mut vendor = Some(vendor_stream);

        let mut recorder = self.open_recorder(&format);

        self.live.store(true, Ordering::SeqCst);

        let (response_tx, mut response_rx) = mpsc::channel::<TranscriberResponse>(64);
        let aggregation_task = self.spawn_aggregation(events, response_tx);

        let mut result = Ok(());

        loop {
            tokio::select! {
                message = stream.next(), if vendor.is_some() => {
                    match message {
                        Some(Ok(Message::Binary(pcm_bytes))) => {
                            self.relay_audio(&pcm_bytes, &format, vendor.as_mut(), recorder.as_mut())
                                .await;
                        }
                        Some(Ok(Message::Text(text))) => {
                            debug!("Ignoring caller text message after start: {}", text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("Session {}: caller hung up", self.session_id);
                            Self::finish_vendor(&mut vendor);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("Session {}: caller socket error: {}", self.session_id, e);
                            Self::finish_vendor(&mut vendor);
                        }
                    }
                }
                response = response_rx.recv() => {
                    match response {
                        Some(response) => {
                            if let Err(e) = Self::send_response(&mut sink, &response).await {
                                warn!("Session {}: failed to deliver transcript: {}", self.session_id, e);
                                result = Err(e);
                                break;
                            }
                        }
                        // Aggregation drained everything it will ever emit
                        None => break,
                    }
                }
            }
        }

        // If we broke out early, the vendor stream may still be open
        Self::finish_vendor(&mut vendor);

        // Closing the receiver unblocks the aggregation task if it is
        // still trying to emit
        drop(response_rx);

        if let Err(e) = aggregation_task.await {
            error!("Session {}: aggregation task panicked: {}", self.session_id, e);
        }

        if let Some(recorder) = recorder.take() {
            if let Err(e) = recorder.finish() {
                warn!("Session {}: failed to finalize recording: {}", self.session_id, e);
            }
        }

        let _ = sink.send(Message::Close(None)).await;
        self.live.store(false, Ordering::SeqCst);

        info!(
            "Session {} finished: {} bytes forwarded, {} utterances",
            self.session_id,
            self.audio_bytes.load(Ordering::SeqCst),
            self.customer_utterances.load(Ordering::SeqCst)
                + self.assistant_utterances.load(Ordering::SeqCst),
        );

        result
    }

    /// Current session statistics
    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);
        let format = self.format.lock().await.clone();
        let audio_bytes = self.audio_bytes.load(Ordering::SeqCst);
        let audio_duration_ms = format
            .as_ref()
            .map(|f| pcm::duration_ms(audio_bytes, f.sample_rate, f.channels))
            .unwrap_or(0);

        SessionStats {
            session_id: self.session_id.clone(),
            live: self.live.load(Ordering::SeqCst),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            format,
            audio_bytes_forwarded: audio_bytes,
            audio_duration_ms,
            vendor_events: self.vendor_events.load(Ordering::SeqCst),
            customer_utterances: self.customer_utterances.load(Ordering::SeqCst),
            assistant_utterances: self.assistant_utterances.load(Ordering::SeqCst),
        }
    }

    /// Wait for the start message that declares the audio format.
    /// Anything else ends the session.
    async fn await_start(&self, stream: &mut SplitStream<WebSocket>) -> Result<StreamFormat> {
        let message = tokio::time::timeout(START_TIMEOUT, stream.next())
            .await
            .context("Timed out waiting for start message")?
            .context("Caller disconnected before sending start")?
            .context("Caller socket error before start")?;

        match message {
            Message::Text(text) => {
                let InboundMessage::Start {
                    encoding,
                    container,
                    sample_rate,
                    channels,
                } = serde_json::from_str(&text)
                    .context("First message was not a valid start message")?;

                Ok(StreamFormat {
                    encoding,
                    container,
                    sample_rate,
                    channels,
                })
            }
            other => bail!("Expected a start message first, got {:?}", other),
        }
    }

    fn open_vendor(&self, format: &StreamFormat) -> Result<Box<dyn SpeechStream>> {
        self.provider
            .open(&self.config.transcriber, format)
            .context("Failed to create vendor stream")
    }

    fn open_recorder(&self, format: &StreamFormat) -> Option<SessionRecorder> {
        if !self.config.recording.enabled {
            return None;
        }

        match SessionRecorder::create(
            Path::new(&self.config.recording.output_dir),
            &self.session_id,
            format.sample_rate,
            format.channels,
        ) {
            Ok(recorder) => Some(recorder),
            Err(e) => {
                // Recording is a tap; its failure never takes the call down
                warn!("Session {}: recording disabled: {:#}", self.session_id, e);
                None
            }
        }
    }

    /// Forward one binary frame to the vendor (and the recorder tap).
    async fn relay_audio(
        &self,
        pcm_bytes: &[u8],
        format: &StreamFormat,
        vendor: Option<&mut Box<dyn SpeechStream>>,
        recorder: Option<&mut SessionRecorder>,
    ) {
        if let Err(e) = pcm::validate_frame(pcm_bytes, format.channels) {
            warn!("Session {}: dropping audio frame: {}", self.session_id, e);
            return;
        }

        if let Some(recorder) = recorder {
            if let Err(e) = recorder.write(pcm_bytes) {
                warn!("Session {}: recording write failed: {}", self.session_id, e);
            }
        }

        if let Some(vendor) = vendor {
            match vendor.send_audio(pcm_bytes).await {
                Ok(()) => {
                    self.audio_bytes.fetch_add(pcm_bytes.len(), Ordering::SeqCst);
                }
                Err(e) => {
                    error!("Session {}: {:#}", self.session_id, e);
                }
            }
        }
    }

    /// Hand the vendor stream off to a background task that signals
    /// end-of-audio and waits for the vendor to drain. Results keep
    /// flowing through the aggregation task in the meantime.
    fn finish_vendor(vendor: &mut Option<Box<dyn SpeechStream>>) {
        if let Some(mut vendor) = vendor.take() {
            tokio::spawn(async move {
                if let Err(e) = vendor.finish().await {
                    warn!("Vendor stream shutdown failed: {:#}", e);
                }
            });
        }
    }

    /// Run vendor events through the aggregator and emit completed
    /// utterances. Ends when the vendor event channel closes, draining
    /// whatever is still buffered.
    fn spawn_aggregation(
        &self,
        mut events: mpsc::Receiver<TranscriptEvent>,
        response_tx: mpsc::Sender<TranscriberResponse>,
    ) -> tokio::task::JoinHandle<()> {
        let debounce = self.config.aggregator.debounce();
        let vendor_events = Arc::clone(&self.vendor_events);
        let customer_utterances = Arc::clone(&self.customer_utterances);
        let assistant_utterances = Arc::clone(&self.assistant_utterances);
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            let mut aggregator = ChannelAggregator::new(debounce);
            let mut sweep = tokio::time::interval(SWEEP_INTERVAL);

            let emit = |utterance: Utterance| {
                let response_tx = response_tx.clone();
                let customer_utterances = Arc::clone(&customer_utterances);
                let assistant_utterances = Arc::clone(&assistant_utterances);
                async move {
                    match utterance.channel {
                        Channel::Customer => customer_utterances.fetch_add(1, Ordering::SeqCst),
                        Channel::Assistant => assistant_utterances.fetch_add(1, Ordering::SeqCst),
                    };
                    response_tx
                        .send(TranscriberResponse::new(utterance.channel, utterance.text))
                        .await
                        .is_ok()
                }
            };

            loop {
                tokio::select! {
                    event = events.recv() => {
                        match event {
                            Some(event) => {
                                vendor_events.fetch_add(1, Ordering::SeqCst);
                                if let Some(utterance) = aggregator.ingest(&event, Instant::now()) {
                                    if !emit(utterance).await {
                                        return;
                                    }
                                }
                            }
                            None => break,
                        }
                    }
                    _ = sweep.tick() => {
                        for utterance in aggregator.sweep(Instant::now()) {
                            if !emit(utterance).await {
                                return;
                            }
                        }
                    }
                }
            }

            // Vendor is done; deliver whatever is still buffered
            for utterance in aggregator.drain() {
                if !emit(utterance).await {
                    return;
                }
            }

            debug!("Session {}: aggregation finished", session_id);
        })
    }

    async fn send_response(
        sink: &mut SplitSink<WebSocket, Message>,
        response: &TranscriberResponse,
    ) -> Result<()> {
        let payload =
            serde_json::to_string(response).context("Failed to serialize transcriber response")?;

        sink.send(Message::Text(payload))
            .await
            .context("Caller socket closed")?;

        Ok(())
    }
}
