use super::TranscriptEvent;
use serde::Deserialize;

/// One message from the vendor's realtime results stream.
///
/// Only `Results` messages carry transcripts; `Metadata`,
/// `UtteranceEnd` and friends are housekeeping and map to no event.
#[derive(Debug, Deserialize)]
pub struct StreamResponse {
    #[serde(rename = "type")]
    pub kind: String,

    /// `[index, total_channels]` when multichannel is enabled
    #[serde(default)]
    pub channel_index: Vec<usize>,

    #[serde(default)]
    pub is_final: bool,

    #[serde(default)]
    pub speech_final: bool,

    pub channel: Option<ResponseChannel>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChannel {
    pub alternatives: Vec<ResponseAlternative>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseAlternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

impl StreamResponse {
    /// Normalize into a transcript event, taking the top alternative.
    /// Returns `None` for non-result messages.
    pub fn into_event(self) -> Option<TranscriptEvent> {
        if self.kind != "Results" {
            return None;
        }

        let channel_index = self.channel_index.first().copied()?;
        let alternative = self.channel?.alternatives.into_iter().next()?;

        Some(TranscriptEvent {
            channel_index,
            text: alternative.transcript,
            confidence: alternative.confidence,
            is_final: self.is_final,
            speech_final: self.speech_final,
        })
    }
}
