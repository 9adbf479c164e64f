use super::pcm;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes a session's inbound caller audio to a WAV file.
///
/// The recorder is a passive tap on the bridge: it sees exactly the
/// interleaved PCM the caller sent, in the format the start message
/// declared.
pub struct SessionRecorder {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    file_path: PathBuf,
    sample_count: usize,
}

impl SessionRecorder {
    pub fn create(
        output_dir: &Path,
        session_id: &str,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self> {
        fs::create_dir_all(output_dir).context("Failed to create recording directory")?;

        let file_path = output_dir.join(format!("{}.wav", session_id));

        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&file_path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", file_path))?;

        info!("Recording session audio to {:?}", file_path);

        Ok(Self {
            writer: Some(writer),
            file_path,
            sample_count: 0,
        })
    }

    /// Append a frame of raw little-endian PCM bytes.
    pub fn write(&mut self, pcm_bytes: &[u8]) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for sample in pcm::samples_from_le_bytes(pcm_bytes) {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
            self.sample_count += pcm_bytes.len() / 2;
        }

        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        info!(
            "Session recording complete: {:?} ({} samples)",
            self.file_path, self.sample_count
        );

        Ok(self.file_path.clone())
    }
}

impl Drop for SessionRecorder {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
