use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vodprep",
    about = "Fetch a remote video or read a local one and normalize its audio for speech recognition",
    version,
    long_about = "Downloads a video with yt-dlp (or reads a local video file), extracts the audio \
track, and normalizes it to mono 16 kHz AAC in a fast-start M4A container - the input format a \
transcription pipeline expects. The produced file's duration is checked against the source and a \
single best-effort repair re-encode is attempted on mismatch."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a URL or local video file into normalized audio
    Convert {
        /// URL or path to convert (any yt-dlp-supported platform, or a
        /// local .mp4/.mov/.avi/.flv file)
        #[arg(value_name = "URL_OR_FILE")]
        input: String,

        /// Directory the audio file is written to (created if absent)
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output_dir: PathBuf,
    },

    /// Query metadata for a remote video without downloading it
    Info {
        /// URL to query
        #[arg(value_name = "URL")]
        url: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
}
