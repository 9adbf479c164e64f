use anyhow::{bail, Result};

/// Validate that a binary frame holds whole interleaved sample frames
/// (16-bit samples, `channels` samples per frame).
pub fn validate_frame(bytes: &[u8], channels: u16) -> Result<()> {
    if channels == 0 {
        bail!("Channel count must be at least 1");
    }

    let frame_bytes = 2 * channels as usize;
    if bytes.len() % frame_bytes != 0 {
        bail!(
            "Audio frame of {} bytes is not aligned to {}-byte sample frames",
            bytes.len(),
            frame_bytes
        );
    }

    Ok(())
}

/// Decode little-endian 16-bit PCM bytes into samples.
pub fn samples_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Duration covered by a PCM byte run, in milliseconds.
pub fn duration_ms(byte_len: usize, sample_rate: u32, channels: u16) -> u64 {
    if sample_rate == 0 || channels == 0 {
        return 0;
    }

    let frames = byte_len as u64 / (2 * channels as u64);
    frames * 1000 / sample_rate as u64
}
