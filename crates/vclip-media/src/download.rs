//! Source-video acquisition for `source_type=url`, via `yt-dlp`.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Download a video to `output_path`. Each job writes into its own fresh
/// scratch directory (see the Worker's scratch-dir lifecycle), so there is
/// no pre-existing file to reuse here — this always invokes `yt-dlp`.
pub async fn download_video(url: &str, output_path: impl AsRef<Path>) -> MediaResult<()> {
    let output_path = output_path.as_ref();

    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    info!("downloading {url} to {}", output_path.display());

    let output = Command::new("yt-dlp")
        .args([
            "--remote-components",
            "ejs:github",
            "-f",
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
            "-o",
        ])
        .arg(output_path)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {stderr}");
        return Err(MediaError::download_failed(format!(
            "yt-dlp failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    if !output_path.exists() {
        return Err(MediaError::download_failed("yt-dlp reported success but wrote no output file"));
    }

    let file_size = output_path.metadata()?.len();
    info!(
        "downloaded {} ({:.1} MB)",
        output_path.display(),
        file_size as f64 / (1024.0 * 1024.0)
    );

    Ok(())
}

/// Cheap pre-flight check so a URL from a platform `yt-dlp` doesn't support
/// fails fast with `SourceUnusable` instead of burning a download attempt
/// and its retries.
pub fn is_supported_url(url: &str) -> bool {
    const SUPPORTED_DOMAINS: &[&str] = &[
        "youtube.com",
        "youtu.be",
        "vimeo.com",
        "twitter.com",
        "x.com",
        "twitch.tv",
        "tiktok.com",
    ];

    SUPPORTED_DOMAINS.iter().any(|domain| url.contains(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_supported_url_matches_known_platforms() {
        assert!(is_supported_url("https://youtube.com/watch?v=abc"));
        assert!(is_supported_url("https://youtu.be/abc"));
        assert!(is_supported_url("https://vimeo.com/123"));
        assert!(!is_supported_url("https://example.com/video"));
    }
}
