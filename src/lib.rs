//! vodprep - Fetch or read a video, extract its audio, normalize it for speech recognition
//!
//! This library downloads a remote video via yt-dlp (or reads a local video file),
//! transcodes its audio track to mono 16 kHz AAC in an M4A container with fast-start
//! layout, and validates the result's duration against the source. It is the audio
//! preparation stage of a transcription pipeline.

pub mod cli;
pub mod config;
pub mod convert;
pub mod sources;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::ConvertOptions;
pub use convert::{Conversion, ConversionPipeline};
pub use sources::remote::VideoInfo;
pub use sources::{Acquisition, Source};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Fatal failure kinds, one per pipeline phase that may abort a call.
///
/// Duration-probe and repair failures are deliberately absent: those are
/// logged and swallowed, never propagated.
#[derive(thiserror::Error, Debug)]
pub enum PrepError {
    #[error("acquisition failed for {reference}")]
    Acquisition {
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("local audio extraction failed for {path}")]
    LocalExtraction {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("downloaded audio file not found under {dir} (stem {stem})")]
    OutputNotFound { dir: String, stem: String },

    #[error("metadata query failed for {reference}")]
    MetadataQuery {
        reference: String,
        #[source]
        source: anyhow::Error,
    },
}
