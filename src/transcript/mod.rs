//! Per-channel transcript segmentation.
//!
//! The upstream vendor emits a stream of partial and final results per
//! audio channel. This module turns that stream into whole utterances:
//! finals accumulate per channel, `speech_final` closes an utterance,
//! and a debounce timer closes anything the vendor leaves hanging.

mod aggregator;

pub use aggregator::{ChannelAggregator, Utterance};
