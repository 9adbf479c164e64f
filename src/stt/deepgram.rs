use super::messages::StreamResponse;
use super::{SpeechStream, TranscriptEvent};
use crate::bridge::protocol::StreamFormat;
use crate::config::TranscriberConfig;
use anyhow::{Context, Result};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Streaming connection to Deepgram's realtime `listen` endpoint.
///
/// Audio goes out as binary WebSocket frames; results come back as JSON
/// text frames parsed by a background reader task.
pub struct DeepgramStream {
    config: TranscriberConfig,
    format: StreamFormat,
    api_key: String,
    sink: Option<WsSink>,
    reader_task: Option<JoinHandle<()>>,
}

impl DeepgramStream {
    pub fn new(config: TranscriberConfig, format: StreamFormat, api_key: String) -> Self {
        Self {
            config,
            format,
            api_key,
            sink: None,
            reader_task: None,
        }
    }

    /// Build the streaming URL. Multichannel is always on so each call
    /// leg is transcribed independently.
    pub fn stream_url(config: &TranscriberConfig, format: &StreamFormat) -> String {
        format!(
            "{}?encoding={}&sample_rate={}&channels={}&multichannel=true&model={}&language={}&interim_results={}&punctuate={}",
            config.url,
            format.encoding,
            format.sample_rate,
            format.channels,
            config.model,
            config.language,
            config.interim_results,
            config.punctuate,
        )
    }
}

#[async_trait::async_trait]
impl SpeechStream for DeepgramStream {
    async fn start(&mut self) -> Result<mpsc::Receiver<TranscriptEvent>> {
        let url = Self::stream_url(&self.config, &self.format);

        let mut request = url
            .clone()
            .into_client_request()
            .context("Invalid vendor stream URL")?;
        request.headers_mut().insert(
            AUTHORIZATION,
            format!("Token {}", self.api_key)
                .parse()
                .context("API key is not a valid header value")?,
        );

        let (ws, _) = connect_async(request)
            .await
            .context("Failed to connect to speech vendor")?;

        info!(
            "Connected to speech vendor ({}ch @ {}Hz)",
            self.format.channels, self.format.sample_rate
        );

        let (sink, mut stream) = ws.split();
        self.sink = Some(sink);

        let (tx, rx) = mpsc::channel(64);

        let reader = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<StreamResponse>(&text) {
                            Ok(response) => {
                                if let Some(event) = response.into_event() {
                                    if tx.send(event).await.is_err() {
                                        // Session side hung up
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                warn!("Skipping unparseable vendor message: {}", e);
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("Vendor closed the results stream");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Vendor stream error: {}", e);
                        break;
                    }
                }
            }
        });

        self.reader_task = Some(reader);

        Ok(rx)
    }

    async fn send_audio(&mut self, pcm: &[u8]) -> Result<()> {
        let sink = self
            .sink
            .as_mut()
            .context("Vendor stream not started")?;

        sink.send(Message::Binary(pcm.to_vec()))
            .await
            .context("Failed to forward audio to vendor")?;

        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            // CloseStream makes the vendor flush pending finals before
            // it closes the connection from its side
            let close = serde_json::json!({ "type": "CloseStream" }).to_string();
            if let Err(e) = sink.send(Message::Text(close)).await {
                warn!("Failed to send end-of-audio marker: {}", e);
            }
        }

        if let Some(mut task) = self.reader_task.take() {
            match tokio::time::timeout(self.config.drain_timeout(), &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Vendor reader task panicked: {}", e),
                Err(_) => {
                    warn!("Timed out waiting for vendor to drain; dropping the stream");
                    // The reader holds the event channel sender; it has
                    // to go so the session can unwind
                    task.abort();
                    let _ = task.await;
                }
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "deepgram"
    }
}
