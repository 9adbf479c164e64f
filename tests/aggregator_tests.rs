// Tests for per-channel utterance segmentation.
//
// The aggregator sits between the vendor's partial/final result stream
// and the transcriber-response messages sent back to the caller.

use std::time::{Duration, Instant};
use transcriber_bridge::bridge::protocol::Channel;
use transcriber_bridge::stt::TranscriptEvent;
use transcriber_bridge::transcript::ChannelAggregator;

const DEBOUNCE: Duration = Duration::from_millis(1500);

fn event(channel_index: usize, text: &str, is_final: bool, speech_final: bool) -> TranscriptEvent {
    TranscriptEvent {
        channel_index,
        text: text.to_string(),
        confidence: Some(0.95),
        is_final,
        speech_final,
    }
}

#[test]
fn test_speech_final_flushes_immediately() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    let utterance = agg.ingest(&event(0, "hello world", true, true), now);

    let utterance = utterance.expect("speech_final should complete the utterance");
    assert_eq!(utterance.channel, Channel::Customer);
    assert_eq!(utterance.text, "hello world");
    assert!(!agg.has_pending());
}

#[test]
fn test_finals_accumulate_until_speech_final() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    assert!(agg.ingest(&event(0, "so I was", true, false), now).is_none());
    assert!(agg.has_pending());

    let utterance = agg
        .ingest(&event(0, "thinking about it", true, true), now)
        .expect("second final carries speech_final");

    assert_eq!(utterance.text, "so I was thinking about it");
}

#[test]
fn test_interim_results_are_not_accumulated() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    assert!(agg.ingest(&event(0, "so I wa", false, false), now).is_none());
    assert!(!agg.has_pending(), "interims must not buffer text");

    let utterance = agg
        .ingest(&event(0, "so I was thinking", true, true), now)
        .unwrap();
    assert_eq!(utterance.text, "so I was thinking");
}

#[test]
fn test_empty_transcripts_ignored() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    assert!(agg.ingest(&event(0, "", true, true), now).is_none());
    assert!(agg.ingest(&event(0, "   ", true, true), now).is_none());
    assert!(!agg.has_pending());
}

#[test]
fn test_channels_are_independent() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    assert!(agg.ingest(&event(0, "customer talking", true, false), now).is_none());
    assert!(agg.ingest(&event(1, "assistant talking", true, false), now).is_none());

    let customer = agg.ingest(&event(0, "done", true, true), now).unwrap();
    assert_eq!(customer.channel, Channel::Customer);
    assert_eq!(customer.text, "customer talking done");

    // Assistant buffer untouched by the customer flush
    assert!(agg.has_pending());

    let assistant = agg.ingest(&event(1, "also done", true, true), now).unwrap();
    assert_eq!(assistant.channel, Channel::Assistant);
    assert_eq!(assistant.text, "assistant talking also done");
}

#[test]
fn test_debounce_sweep_flushes_quiet_channel() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let t0 = Instant::now();

    agg.ingest(&event(0, "trailing words", true, false), t0);

    // Not quiet long enough yet
    assert!(agg.sweep(t0 + Duration::from_millis(500)).is_empty());

    let flushed = agg.sweep(t0 + Duration::from_millis(1600));
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].channel, Channel::Customer);
    assert_eq!(flushed[0].text, "trailing words");
    assert!(!agg.has_pending());
}

#[test]
fn test_interim_activity_postpones_debounce() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let t0 = Instant::now();

    agg.ingest(&event(0, "first part", true, false), t0);

    // Speaker is still going: an interim refreshes the timestamp
    agg.ingest(&event(0, "first part and", false, false), t0 + Duration::from_millis(1000));

    // 1600ms after the final, but only 600ms after the interim
    assert!(agg.sweep(t0 + Duration::from_millis(1600)).is_empty());

    let flushed = agg.sweep(t0 + Duration::from_millis(2600));
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].text, "first part");
}

#[test]
fn test_sweep_never_emits_empty_utterances() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let t0 = Instant::now();

    // Only interim activity, nothing buffered
    agg.ingest(&event(0, "partial", false, false), t0);

    assert!(agg.sweep(t0 + Duration::from_secs(10)).is_empty());
}

#[test]
fn test_drain_flushes_all_channels() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    agg.ingest(&event(0, "customer tail", true, false), now);
    agg.ingest(&event(1, "assistant tail", true, false), now);

    let mut drained = agg.drain();
    drained.sort_by_key(|u| u.channel.index());

    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].text, "customer tail");
    assert_eq!(drained[1].text, "assistant tail");
    assert!(!agg.has_pending());
}

#[test]
fn test_unmapped_channel_index_dropped() {
    let mut agg = ChannelAggregator::new(DEBOUNCE);
    let now = Instant::now();

    assert!(agg.ingest(&event(5, "ghost channel", true, true), now).is_none());
    assert!(!agg.has_pending());
}
