use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{Acquisition, AudioSource};
use crate::config::ConvertOptions;
use crate::convert::validate::probe_duration;
use crate::{PrepError, Result};

/// Extracts and normalizes audio from a video file already on disk.
/// No network access; ffmpeg does all the work.
pub struct LocalExtractor {
    path: PathBuf,
}

impl LocalExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Title for a local file: its base file name, extension included
    pub fn title_for(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned())
    }

    /// ffmpeg arguments for the extract-and-normalize pass: strip video,
    /// mono, 16 kHz, AAC at the configured bitrate, fast-start layout.
    pub fn extract_args(input: &Path, output: &Path, options: &ConvertOptions) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-ac".to_string(),
            options.channels.to_string(),
            "-ar".to_string(),
            options.sample_rate.to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            options.audio_bitrate.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    async fn transcode(&self, output: &Path, options: &ConvertOptions) -> Result<()> {
        tracing::info!("Extracting audio from local file: {}", self.path.display());

        let result = Command::new("ffmpeg")
            .args(Self::extract_args(&self.path, output, options))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !result.status.success() {
            let error = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("ffmpeg exited with {}: {}", result.status, error.trim());
        }

        Ok(())
    }
}

#[async_trait]
impl AudioSource for LocalExtractor {
    async fn acquire(&self, options: &ConvertOptions, stem: &str) -> Result<Acquisition> {
        let title = Self::title_for(&self.path);
        let audio_path = options
            .output_dir
            .join(format!("{stem}.{}", options.audio_format));

        self.transcode(&audio_path, options)
            .await
            .map_err(|source| PrepError::LocalExtraction {
                path: self.path.display().to_string(),
                source,
            })?;

        tracing::info!("Audio extracted to: {}", audio_path.display());

        // Nominal duration of the source, for the downstream tolerance
        // check. A failed probe degrades to 0.0 (= skip validation).
        let expected_duration = probe_duration(&self.path).await;

        Ok(Acquisition {
            title,
            expected_duration,
            audio_path: Some(audio_path),
        })
    }
}
