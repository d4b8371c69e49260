use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

use super::{Acquisition, AudioSource};
use crate::config::ConvertOptions;
use crate::{PrepError, Result};

/// Metadata record for a remote reference, queried without downloading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    /// Duration in seconds; 0 when the platform does not report one
    pub duration: f64,
    pub uploader: String,
    pub upload_date: String,
    pub description: String,
    pub view_count: u64,
}

/// Remote fetcher delegating to the yt-dlp binary.
///
/// Metadata extraction and download are two separate invocations, metadata
/// first; downloading is never assumed to produce metadata as a side effect.
pub struct RemoteFetcher {
    yt_dlp_path: String,
    reference: String,
}

impl RemoteFetcher {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            reference: reference.into(),
        }
    }

    /// Arguments for the metadata-only probe
    pub fn metadata_args(reference: &str, quiet: bool) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string(), "--no-playlist".to_string()];
        if quiet {
            args.push("--quiet".to_string());
            args.push("--no-warnings".to_string());
        }
        args.push(reference.to_string());
        args
    }

    /// Arguments for the download + extract-audio pass.
    ///
    /// `output_template` is a yt-dlp template like `out/audio_1a2b3c4d.%(ext)s`;
    /// the post-processor fills in the final extension. `--no-playlist` is a
    /// correctness guarantee: one reference must never expand into multiple
    /// downloads.
    pub fn download_args(
        reference: &str,
        output_template: &str,
        options: &ConvertOptions,
    ) -> Vec<String> {
        let mut args = vec![
            "--output".to_string(),
            output_template.to_string(),
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            options.audio_format.clone(),
            "--audio-quality".to_string(),
            options.audio_bitrate.clone(),
            "--postprocessor-args".to_string(),
            format!("ffmpeg:{}", options.postprocessor_args()),
            "--no-playlist".to_string(),
        ];
        if options.quiet {
            args.push("--quiet".to_string());
            args.push("--no-warnings".to_string());
        }
        args.push(reference.to_string());
        args
    }

    /// Check that yt-dlp is on PATH
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn dump_json(&self, quiet: bool) -> Result<Value> {
        tracing::debug!("Extracting metadata for: {}", self.reference);

        let output = Command::new(&self.yt_dlp_path)
            .args(Self::metadata_args(&self.reference, quiet))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp metadata extraction failed: {}", error.trim());
        }

        let info: Value = serde_json::from_slice(&output.stdout)?;
        Ok(info)
    }

    /// Title and nominal duration for the reference, without downloading
    async fn metadata(&self, options: &ConvertOptions) -> Result<(String, f64)> {
        let info = self.dump_json(options.quiet).await?;

        let title = info["title"].as_str().unwrap_or("unknown").to_string();
        let duration = info["duration"].as_f64().unwrap_or(0.0);

        Ok((title, duration))
    }

    /// Download the reference and post-process into the normalized audio
    /// format. Writes files matching `output_template`; locating the result
    /// is the pipeline's job.
    async fn download(&self, options: &ConvertOptions, stem: &str) -> Result<()> {
        let output_template = options
            .output_dir
            .join(format!("{stem}.%(ext)s"))
            .to_string_lossy()
            .into_owned();

        tracing::info!("Downloading: {}", self.reference);

        let output = Command::new(&self.yt_dlp_path)
            .args(Self::download_args(&self.reference, &output_template, options))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp download failed: {}", error.trim());
        }

        Ok(())
    }

    /// Full metadata record for a remote reference, without downloading.
    /// Independent of the conversion flow.
    pub async fn video_info(&self) -> Result<VideoInfo> {
        let info = self
            .dump_json(true)
            .await
            .map_err(|source| PrepError::MetadataQuery {
                reference: self.reference.clone(),
                source,
            })?;

        Ok(VideoInfo {
            title: info["title"].as_str().unwrap_or("").to_string(),
            duration: info["duration"].as_f64().unwrap_or(0.0),
            uploader: info["uploader"].as_str().unwrap_or("").to_string(),
            upload_date: info["upload_date"].as_str().unwrap_or("").to_string(),
            description: info["description"].as_str().unwrap_or("").to_string(),
            view_count: info["view_count"].as_u64().unwrap_or(0),
        })
    }
}

#[async_trait]
impl AudioSource for RemoteFetcher {
    async fn acquire(&self, options: &ConvertOptions, stem: &str) -> Result<Acquisition> {
        // Metadata first, then the download proper; both wrap into the same
        // acquisition failure kind on error.
        let (title, expected_duration) = self
            .metadata(options)
            .await
            .map_err(|source| PrepError::Acquisition {
                reference: self.reference.clone(),
                source,
            })?;

        tracing::info!("Title: {}", title);

        self.download(options, stem)
            .await
            .map_err(|source| PrepError::Acquisition {
                reference: self.reference.clone(),
                source,
            })?;

        Ok(Acquisition {
            title,
            expected_duration,
            audio_path: None,
        })
    }
}
