use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub transcriber: TranscriberConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Upstream speech vendor settings
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriberConfig {
    /// Base WebSocket URL of the vendor's streaming endpoint
    pub url: String,

    /// Name of the environment variable holding the vendor API key
    /// (secrets stay out of config files)
    pub api_key_env: String,

    /// Vendor model identifier
    pub model: String,

    /// BCP-47 language tag
    pub language: String,

    /// Ask the vendor for interim (partial) results
    pub interim_results: bool,

    /// Ask the vendor to punctuate transcripts
    pub punctuate: bool,

    /// How long to wait for remaining vendor results after end of
    /// audio (milliseconds)
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

fn default_drain_timeout_ms() -> u64 {
    10_000
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            url: "wss://api.deepgram.com/v1/listen".to_string(),
            api_key_env: "DEEPGRAM_API_KEY".to_string(),
            model: "nova-2".to_string(),
            language: "en".to_string(),
            interim_results: true,
            punctuate: true,
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl TranscriberConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Idle window after the last final result before a buffered
    /// utterance is flushed anyway (milliseconds)
    pub debounce_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { debounce_ms: 1500 }
    }
}

impl AggregatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// Tee inbound caller audio to a WAV file per session
    pub enabled: bool,

    /// Directory for session recordings
    pub output_dir: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: "recordings".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
