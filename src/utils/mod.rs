use anyhow::Result;
use url::Url;

/// Output file stem with a random 8-character id, e.g. `audio_1a2b3c4d`.
/// Concurrent conversions into one directory rely on this for collision
/// freedom.
pub fn unique_stem() -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_string();
    format!("audio_{id}")
}

/// Validate that a string parses as an HTTP(S) URL
pub fn validate_remote_reference(reference: &str) -> Result<Url> {
    let parsed = Url::parse(reference)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", reference))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}

/// Check for the external tools the pipeline shells out to
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for downloading remote videos".to_string());
    }

    if !check_command_available("ffmpeg").await {
        missing.push("ffmpeg - required for audio extraction and repair".to_string());
    }

    if !check_command_available("ffprobe").await {
        missing.push("ffprobe - required for duration validation".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_stem_is_audio_plus_eight_hex_chars() {
        let stem = unique_stem();
        assert!(stem.starts_with("audio_"));
        let id = &stem["audio_".len()..];
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unique_stems_do_not_collide() {
        let a = unique_stem();
        let b = unique_stem();
        assert_ne!(a, b);
    }

    #[test]
    fn validate_remote_reference_accepts_http_and_https() {
        assert!(validate_remote_reference("https://example.com/watch?v=abc123").is_ok());
        assert!(validate_remote_reference("http://example.com").is_ok());
        assert!(validate_remote_reference("ftp://example.com").is_err());
        assert!(validate_remote_reference("not-a-url").is_err());
    }
}
