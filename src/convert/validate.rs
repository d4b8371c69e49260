use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::ConvertOptions;

/// Relative duration difference above which a transcode is treated as
/// possibly corrupted or truncated
pub const DURATION_TOLERANCE: f64 = 0.1;

/// Outcome of the duration check. Informational only; validation never
/// fails a conversion.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Path to use going forward (the repaired file when a repair succeeded)
    pub audio_path: PathBuf,
    /// Probed duration of the original transcode; 0.0 when unknown
    pub actual_duration: f64,
    /// Whether a repair re-encode was applied
    pub repaired: bool,
}

/// ffprobe arguments printing just the container duration
pub fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path.to_string_lossy().into_owned(),
    ]
}

/// ffmpeg arguments for the repair re-encode: audio stream only, AAC at the
/// repair bitrate, fast-start
pub fn repair_args(input: &Path, output: &Path, options: &ConvertOptions) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vn".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        options.repair_bitrate.clone(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// True when both durations are known and their relative difference exceeds
/// the tolerance. Zero/unknown on either side skips validation.
pub fn needs_repair(expected: f64, actual: f64) -> bool {
    if expected <= 0.0 || actual <= 0.0 {
        return false;
    }
    (actual - expected).abs() / expected > DURATION_TOLERANCE
}

/// Probe a file's duration in seconds. Any failure (ffprobe missing,
/// nonzero exit, unparseable output) degrades to 0.0 with a warning.
pub async fn probe_duration(path: &Path) -> f64 {
    let result = Command::new("ffprobe")
        .args(probe_args(path))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::warn!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return 0.0;
        }
        Err(e) => {
            tracing::warn!("could not run ffprobe for {}: {}", path.display(), e);
            return 0.0;
        }
    };

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Check the produced file's duration against the expected one and attempt
/// a single repair re-encode when they disagree beyond tolerance.
///
/// Best-effort throughout: a failed repair keeps the original file, and a
/// duration mismatch alone never fails the conversion.
pub async fn validate_duration(
    audio_path: &Path,
    expected_duration: f64,
    options: &ConvertOptions,
) -> ValidationOutcome {
    DurationValidator::new()
        .validate(audio_path, expected_duration, options)
        .await
}

/// Duration check and repair pass, with the ffmpeg binary location as a knob
pub struct DurationValidator {
    ffmpeg_path: String,
}

impl DurationValidator {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }

    /// Use an ffmpeg binary that is not on PATH
    pub fn with_ffmpeg_path(mut self, path: impl Into<String>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Probe the produced file, then compare and repair if needed
    pub async fn validate(
        &self,
        audio_path: &Path,
        expected_duration: f64,
        options: &ConvertOptions,
    ) -> ValidationOutcome {
        let actual_duration = probe_duration(audio_path).await;
        self.validate_with_actual(audio_path, expected_duration, actual_duration, options)
            .await
    }

    /// Tolerance check and repair pass for an already-probed duration
    pub async fn validate_with_actual(
        &self,
        audio_path: &Path,
        expected_duration: f64,
        actual_duration: f64,
        options: &ConvertOptions,
    ) -> ValidationOutcome {
        if !needs_repair(expected_duration, actual_duration) {
            return ValidationOutcome {
                audio_path: audio_path.to_path_buf(),
                actual_duration,
                repaired: false,
            };
        }

        tracing::warn!(
            "duration mismatch for {}: expected {:.2}s, got {:.2}s; attempting repair",
            audio_path.display(),
            expected_duration,
            actual_duration
        );

        let repaired_path = repair_target(audio_path, &options.audio_format);
        match self.repair(audio_path, &repaired_path, options).await {
            Ok(()) => {
                // Re-probe of the repaired file is informational only; the
                // repaired path is adopted either way.
                let new_duration = probe_duration(&repaired_path).await;
                tracing::info!(
                    "repair complete: {} (~{:.2}s)",
                    repaired_path.display(),
                    new_duration
                );
                ValidationOutcome {
                    audio_path: repaired_path,
                    actual_duration,
                    repaired: true,
                }
            }
            Err(e) => {
                tracing::error!("repair failed for {}: {}", audio_path.display(), e);
                ValidationOutcome {
                    audio_path: audio_path.to_path_buf(),
                    actual_duration,
                    repaired: false,
                }
            }
        }
    }

    async fn repair(
        &self,
        input: &Path,
        output: &Path,
        options: &ConvertOptions,
    ) -> crate::Result<()> {
        let result = Command::new(&self.ffmpeg_path)
            .args(repair_args(input, output, options))
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

impl Default for DurationValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sibling path with a `_fixed` suffix and the target extension
fn repair_target(audio_path: &Path, audio_format: &str) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    audio_path.with_file_name(format!("{stem}_fixed.{audio_format}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn unknown_durations_skip_validation() {
        assert!(!needs_repair(0.0, 120.0));
        assert!(!needs_repair(120.0, 0.0));
        assert!(!needs_repair(0.0, 0.0));
    }

    #[test]
    fn within_tolerance_needs_no_repair() {
        assert!(!needs_repair(100.0, 100.0));
        assert!(!needs_repair(100.0, 91.0));
        assert!(!needs_repair(100.0, 109.0));
        // exactly 10% off is still tolerated
        assert!(!needs_repair(100.0, 110.0));
        assert!(!needs_repair(100.0, 90.0));
    }

    #[test]
    fn beyond_tolerance_needs_repair() {
        assert!(needs_repair(100.0, 89.0));
        assert!(needs_repair(100.0, 111.0));
        assert!(needs_repair(60.0, 5.0));
    }

    #[test]
    fn repair_target_appends_fixed_suffix() {
        let target = repair_target(Path::new("/tmp/out/audio_1a2b3c4d.m4a"), "m4a");
        assert_eq!(target, Path::new("/tmp/out/audio_1a2b3c4d_fixed.m4a"));

        let webm = repair_target(Path::new("/tmp/out/audio_1a2b3c4d.webm"), "m4a");
        assert_eq!(webm, Path::new("/tmp/out/audio_1a2b3c4d_fixed.m4a"));
    }

    #[test]
    fn probe_args_quote_nothing() {
        let args = probe_args(Path::new("/tmp/odd name's file.m4a"));
        assert_eq!(args.last().unwrap(), "/tmp/odd name's file.m4a");
        assert!(args.windows(2).any(|w| w == ["-show_entries", "format=duration"]));
    }

    #[tokio::test]
    async fn unknown_expected_duration_keeps_the_file_untouched() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("audio_1a2b3c4d.m4a");
        fs::write(&audio, b"not really audio").unwrap();

        let outcome = validate_duration(&audio, 0.0, &ConvertOptions::default()).await;
        assert_eq!(outcome.audio_path, audio);
        assert!(!outcome.repaired);
    }

    #[tokio::test]
    async fn failed_repair_keeps_the_original_path() {
        // Durations disagree well beyond tolerance, so the repair pass runs;
        // the re-encode command exits nonzero and the original file must
        // survive as the result.
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("audio_ffffffff.m4a");
        fs::write(&audio, b"truncated").unwrap();

        let outcome = DurationValidator::new()
            .with_ffmpeg_path("false")
            .validate_with_actual(&audio, 300.0, 100.0, &ConvertOptions::default())
            .await;

        assert_eq!(outcome.audio_path, audio);
        assert!(!outcome.repaired);
        assert_eq!(outcome.actual_duration, 100.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_repair_adopts_the_fixed_path() {
        // A re-encode command that exits zero stands in for ffmpeg; the
        // repaired path is adopted unconditionally, with the re-probe being
        // informational only.
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("audio_ffffffff.m4a");
        fs::write(&audio, b"truncated").unwrap();

        let outcome = DurationValidator::new()
            .with_ffmpeg_path("true")
            .validate_with_actual(&audio, 300.0, 100.0, &ConvertOptions::default())
            .await;

        assert_eq!(outcome.audio_path, dir.path().join("audio_ffffffff_fixed.m4a"));
        assert!(outcome.repaired);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn within_tolerance_never_invokes_the_re_encode() {
        // The stand-in re-encode command would succeed and swap in the
        // _fixed path if it ran; an in-tolerance result must keep the
        // original untouched instead.
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("audio_ffffffff.m4a");
        fs::write(&audio, b"fine").unwrap();

        let outcome = DurationValidator::new()
            .with_ffmpeg_path("true")
            .validate_with_actual(&audio, 100.0, 105.0, &ConvertOptions::default())
            .await;

        assert_eq!(outcome.audio_path, audio);
        assert!(!outcome.repaired);
    }
}
