use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::config::ConvertOptions;
use crate::sources::local::LocalExtractor;
use crate::sources::remote::RemoteFetcher;
use crate::sources::{AudioSource, Source};
use crate::utils;
use crate::{PrepError, Result};

pub mod validate;

/// Final result of a conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Normalized audio file (M4A/AAC, mono, 16 kHz, fast-start), or the
    /// repaired `_fixed` variant when a repair was applied
    pub audio_path: PathBuf,

    /// Human-readable title (remote metadata title, or the local file name)
    pub title: String,

    /// Probed duration of the produced audio in seconds; 0.0 when unknown
    pub actual_duration: f64,

    /// Whether the duration-triggered repair pass ran and succeeded
    pub repaired: bool,
}

/// One-shot conversion pipeline: resolve → acquire → locate → validate.
///
/// Holds no state between calls; output file names carry a random id, so
/// concurrent pipelines may share an output directory without coordination.
pub struct ConversionPipeline {
    options: ConvertOptions,
    show_progress: bool,
}

impl ConversionPipeline {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            show_progress: false,
        }
    }

    /// Show a spinner while the (potentially long) remote download runs
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Convert a URL or local video file into normalized audio.
    ///
    /// Resolution, acquisition, and output locating failures abort the call;
    /// duration validation and repair problems are logged and swallowed.
    pub async fn convert(&self, input: &str) -> Result<Conversion> {
        fs_err::create_dir_all(&self.options.output_dir)?;

        let stem = utils::unique_stem();

        let (acquisition, remote) = match Source::resolve(input) {
            Source::Local(path) => {
                tracing::info!("Detected local video file: {}", path.display());
                let extractor = LocalExtractor::new(path);
                (extractor.acquire(&self.options, &stem).await?, false)
            }
            Source::Remote(reference) => {
                let fetcher = RemoteFetcher::new(reference);
                let progress = self.spinner();
                let acquisition = fetcher.acquire(&self.options, &stem).await;
                if let Some(progress) = progress {
                    progress.finish_and_clear();
                }
                (acquisition?, true)
            }
        };

        // The local branch already knows its exact output name; downloads
        // need the fallback-extension search.
        let audio_path = match acquisition.audio_path {
            Some(path) => path,
            None => locate_output(&stem, &self.options)?,
        };
        if remote {
            tracing::info!("Downloaded audio: {}", audio_path.display());
        }

        let outcome =
            validate::validate_duration(&audio_path, acquisition.expected_duration, &self.options)
                .await;

        tracing::info!("Final audio file: {}", outcome.audio_path.display());

        Ok(Conversion {
            audio_path: outcome.audio_path,
            title: acquisition.title,
            actual_duration: outcome.actual_duration,
            repaired: outcome.repaired,
        })
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            progress.set_style(style);
        }
        progress.set_message("Downloading audio with yt-dlp...");
        progress.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(progress)
    }
}

/// Locate the file a download produced in the options' output directory:
/// the primary target extension first, then each fallback extension in
/// order. None existing means the download silently failed even though
/// yt-dlp reported success.
pub fn locate_output(stem: &str, options: &ConvertOptions) -> Result<PathBuf> {
    let candidates = std::iter::once(options.audio_format.as_str())
        .chain(options.fallback_extensions.iter().map(String::as_str));

    for ext in candidates {
        let candidate = options.output_dir.join(format!("{stem}.{ext}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(PrepError::OutputNotFound {
        dir: options.output_dir.display().to_string(),
        stem: stem.to_string(),
    }
    .into())
}
