use super::protocol::StreamFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a bridge session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Whether the caller socket is still open
    pub live: bool,

    /// When the caller connected
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Audio format from the start message (None until it arrives)
    pub format: Option<StreamFormat>,

    /// Bytes of caller audio forwarded to the vendor
    pub audio_bytes_forwarded: usize,

    /// Milliseconds of caller audio forwarded, per the declared format
    pub audio_duration_ms: u64,

    /// Transcript events received from the vendor
    pub vendor_events: usize,

    /// Utterances emitted on the customer leg
    pub customer_utterances: usize,

    /// Utterances emitted on the assistant leg
    pub assistant_utterances: usize,
}
