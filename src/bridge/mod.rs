//! The transcription relay bridge.
//!
//! A calling platform opens a WebSocket, declares its audio format with
//! a start message, then streams interleaved stereo PCM (customer on
//! channel 0, assistant on channel 1). The bridge forwards the audio to
//! the speech vendor and answers with transcriber-response messages
//! carrying one utterance per transcript event.

pub mod protocol;
pub mod session;
pub mod stats;

pub use protocol::{Channel, InboundMessage, StreamFormat, TranscriberResponse};
pub use session::BridgeSession;
pub use stats::SessionStats;
