pub mod audio;
pub mod bridge;
pub mod config;
pub mod http;
pub mod stt;
pub mod transcript;

pub use bridge::{BridgeSession, Channel, InboundMessage, SessionStats, StreamFormat, TranscriberResponse};
pub use config::Config;
pub use http::{create_router, AppState};
pub use stt::{SpeechStream, SpeechStreamFactory, SpeechStreamProvider, TranscriptEvent};
pub use transcript::{ChannelAggregator, Utterance};
