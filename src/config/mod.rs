use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable per-call conversion options.
///
/// A pipeline never mutates its options in place; overrides produce a derived
/// copy via the `with_*` methods, so concurrent conversions sharing a default
/// value can never observe each other's changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Directory the audio file is written to (created if absent)
    pub output_dir: PathBuf,

    /// Target container/extension for the normalized audio
    pub audio_format: String,

    /// AAC bitrate for the primary transcode
    pub audio_bitrate: String,

    /// AAC bitrate for the duration-triggered repair re-encode
    pub repair_bitrate: String,

    /// Output sample rate in Hz (16 kHz suits speech models)
    pub sample_rate: u32,

    /// Output channel count (mono)
    pub channels: u32,

    /// Extensions probed, in order, when the post-processor emitted
    /// something other than the primary target
    pub fallback_extensions: Vec<String>,

    /// Pass quiet/no-warnings flags to the downloader
    pub quiet: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            audio_format: "m4a".to_string(),
            audio_bitrate: "192k".to_string(),
            repair_bitrate: "160k".to_string(),
            sample_rate: 16_000,
            channels: 1,
            fallback_extensions: ["webm", "mp4", "mp3", "wav"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            quiet: true,
        }
    }
}

impl ConvertOptions {
    /// Derived copy with a different output directory
    pub fn with_output_dir(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: dir.into(),
            ..self.clone()
        }
    }

    /// Derived copy with downloader chatter enabled (for --verbose runs)
    pub fn with_quiet(&self, quiet: bool) -> Self {
        Self {
            quiet,
            ..self.clone()
        }
    }

    /// The ffmpeg post-processing arguments applied to every transcode:
    /// mono, 16 kHz, moov atom up front.
    pub fn postprocessor_args(&self) -> String {
        format!(
            "-ac {} -ar {} -movflags +faststart",
            self.channels, self.sample_rate
        )
    }
}
