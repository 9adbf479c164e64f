use crate::bridge::protocol::Channel;
use crate::stt::TranscriptEvent;
use std::time::{Duration, Instant};
use tracing::warn;

/// A completed utterance for one call leg, ready to send to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub channel: Channel,
    pub text: String,
}

/// Per-channel accumulation state: the growing transcript buffer and
/// the debounce timestamp of the last vendor activity.
#[derive(Debug, Default)]
struct ChannelState {
    buffer: String,
    last_activity: Option<Instant>,
}

impl ChannelState {
    fn append(&mut self, text: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
    }

    fn take(&mut self) -> Option<String> {
        self.last_activity = None;
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

/// Segments the vendor's partial/final result stream into utterances,
/// independently per audio channel.
///
/// Final results accumulate; `speech_final` closes an utterance
/// immediately; a debounce sweep closes utterances the vendor never
/// marks `speech_final`.
pub struct ChannelAggregator {
    debounce: Duration,
    channels: [ChannelState; 2],
}

impl ChannelAggregator {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            channels: [ChannelState::default(), ChannelState::default()],
        }
    }

    /// Feed one vendor event. Returns an utterance if this event
    /// completed one.
    pub fn ingest(&mut self, event: &TranscriptEvent, now: Instant) -> Option<Utterance> {
        let channel = match Channel::from_index(event.channel_index) {
            Some(c) => c,
            None => {
                warn!(
                    "Dropping transcript for unmapped channel index {}",
                    event.channel_index
                );
                return None;
            }
        };

        let text = event.text.trim();
        if text.is_empty() {
            return None;
        }

        let state = &mut self.channels[channel.index()];
        state.last_activity = Some(now);

        if !event.is_final {
            // Interim results only mark the channel as active
            return None;
        }

        state.append(text);

        if event.speech_final {
            return state.take().map(|text| Utterance { channel, text });
        }

        None
    }

    /// Flush channels whose buffered finals have gone quiet for longer
    /// than the debounce window.
    pub fn sweep(&mut self, now: Instant) -> Vec<Utterance> {
        let mut flushed = Vec::new();

        for channel in [Channel::Customer, Channel::Assistant] {
            let state = &mut self.channels[channel.index()];
            let idle = match state.last_activity {
                Some(at) => now.duration_since(at) >= self.debounce,
                None => false,
            };

            if idle {
                if let Some(text) = state.take() {
                    flushed.push(Utterance { channel, text });
                }
            }
        }

        flushed
    }

    /// Flush everything still buffered. Used when the session ends.
    pub fn drain(&mut self) -> Vec<Utterance> {
        let mut flushed = Vec::new();

        for channel in [Channel::Customer, Channel::Assistant] {
            if let Some(text) = self.channels[channel.index()].take() {
                flushed.push(Utterance { channel, text });
            }
        }

        flushed
    }

    /// Whether any channel still holds unflushed text.
    pub fn has_pending(&self) -> bool {
        self.channels.iter().any(|c| !c.buffer.is_empty())
    }
}
