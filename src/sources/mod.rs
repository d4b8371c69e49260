use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod local;
pub mod remote;

use crate::config::ConvertOptions;
use crate::Result;

/// Video container extensions accepted as local input
pub const LOCAL_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "flv"];

/// What an input string turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An existing file with an allow-listed video extension
    Local(PathBuf),
    /// Anything else; handed to the downloader as-is
    Remote(String),
}

impl Source {
    /// Classify an input string as a local file or a remote reference.
    ///
    /// Local means the path exists on disk AND its extension is one of the
    /// known video containers. Everything else is remote. Purely a
    /// filesystem check; never touches the network.
    pub fn resolve(input: &str) -> Self {
        let path = Path::new(input);
        if path.exists() && has_video_extension(path) {
            Source::Local(path.to_path_buf())
        } else {
            Source::Remote(input.to_string())
        }
    }
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            LOCAL_VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Outcome of acquiring an asset, before duration validation
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// Human-readable title (remote: from metadata; local: the file name)
    pub title: String,

    /// Nominal duration in seconds reported by the source; 0.0 means
    /// unknown, which downstream treats as "skip validation"
    pub expected_duration: f64,

    /// Exact output path, when the acquiring side already knows it
    /// (local transcode). Remote downloads leave this unset and the
    /// pipeline locates the file afterwards.
    pub audio_path: Option<PathBuf>,
}

/// A place audio can be acquired from
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Obtain the asset and normalize its audio into the output directory,
    /// using `stem` (e.g. "audio_1a2b3c4d") for the output file name.
    async fn acquire(&self, options: &ConvertOptions, stem: &str) -> Result<Acquisition>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"stub").unwrap();
        path
    }

    #[test]
    fn existing_file_with_video_extension_is_local() {
        let dir = TempDir::new().unwrap();
        for name in ["clip.mp4", "clip.mov", "clip.avi", "clip.flv"] {
            let path = touch(&dir, name);
            let input = path.to_string_lossy().to_string();
            assert_eq!(Source::resolve(&input), Source::Local(path));
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "CLIP.MP4");
        let input = path.to_string_lossy().to_string();
        assert_eq!(Source::resolve(&input), Source::Local(path));
    }

    #[test]
    fn missing_file_is_remote_even_with_video_extension() {
        let input = "/definitely/not/there/clip.mp4";
        assert_eq!(Source::resolve(input), Source::Remote(input.to_string()));
    }

    #[test]
    fn existing_file_with_other_extension_is_remote() {
        let dir = TempDir::new().unwrap();
        let path = touch(&dir, "notes.txt");
        let input = path.to_string_lossy().to_string();
        assert_eq!(Source::resolve(&input), Source::Remote(input.clone()));
    }

    #[test]
    fn urls_are_remote_without_any_network_access() {
        for input in [
            "https://example.com/watch?v=abc123",
            "http://youtu.be/xyz",
            "https://example.com/playlist?list=PL123",
        ] {
            assert_eq!(Source::resolve(input), Source::Remote(input.to_string()));
        }
    }

    #[test]
    fn resolution_is_exists_plus_extension_only() {
        // Even a directory named like a video resolves Local; the transcode
        // step is where such inputs fail, loudly.
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("folder.mp4");
        fs::create_dir(&sub).unwrap();
        let input = sub.to_string_lossy().to_string();
        assert_eq!(Source::resolve(&input), Source::Local(sub));
    }
}
