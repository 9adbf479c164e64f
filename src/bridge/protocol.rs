use serde::{Deserialize, Serialize};

/// Audio leg of the call, by interleave position.
///
/// The calling platform sends stereo PCM with the customer on
/// channel 0 and the assistant on channel 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Customer,
    Assistant,
}

impl Channel {
    /// Map a vendor channel index onto a call leg.
    /// Indexes beyond the two known legs have no mapping.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::Customer),
            1 => Some(Channel::Assistant),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Channel::Customer => 0,
            Channel::Assistant => 1,
        }
    }
}

/// First message the calling platform sends after the WebSocket opens.
///
/// Everything after it is raw binary PCM in the declared format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    #[serde(rename = "start", rename_all = "camelCase")]
    Start {
        /// PCM encoding, e.g. "linear16"
        encoding: String,
        /// Container framing, e.g. "raw"
        container: String,
        sample_rate: u32,
        channels: u16,
    },
}

/// Transcript event sent back to the calling platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub transcription: String,
    pub channel: Channel,
}

impl TranscriberResponse {
    pub fn new(channel: Channel, transcription: String) -> Self {
        Self {
            kind: "transcriber-response".to_string(),
            transcription,
            channel,
        }
    }
}

/// Audio format negotiated by the start message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFormat {
    pub encoding: String,
    pub container: String,
    pub sample_rate: u32,
    pub channels: u16,
}
