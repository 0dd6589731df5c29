//! Transcriber: whisper-cli subprocess invocation producing timed segments.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};
use vclip_models::TranscriptSegment;

use crate::error::{MediaError, MediaResult};

/// Default ceiling on a single transcription run.
pub const DEFAULT_TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Result of a transcription run: the timed segments plus whatever language
/// whisper detected (used as a fallback when the caller didn't pin one).
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    pub segments: Vec<TranscriptSegment>,
    pub language_detected: String,
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Transcribe `audio_path` using whisper-cli's JSON output mode, with a hint
/// at the expected language (empty string lets whisper auto-detect).
pub async fn transcribe(
    audio_path: impl AsRef<Path>,
    language_hint: &str,
    timeout: Duration,
) -> MediaResult<TranscriptionResult> {
    let audio_path = audio_path.as_ref();

    if !audio_path.exists() {
        return Err(MediaError::FileNotFound(audio_path.to_path_buf()));
    }

    which::which("whisper-cli").map_err(|_| MediaError::WhisperNotFound)?;

    let output_dir = audio_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let stem = audio_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");
    let json_path = output_dir.join(format!("{stem}.json"));

    let mut args = vec![
        "--output-format".to_string(),
        "json".to_string(),
        "--output-dir".to_string(),
        output_dir.to_string_lossy().to_string(),
    ];
    if !language_hint.is_empty() {
        args.push("--language".to_string());
        args.push(language_hint.to_string());
    }

    info!(
        "Transcribing {} (language hint: {:?})",
        audio_path.display(),
        language_hint
    );

    let run = Command::new("whisper-cli")
        .args(&args)
        .arg(audio_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, run).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                "whisper-cli timed out after {} seconds",
                timeout.as_secs()
            );
            return Err(MediaError::Timeout(timeout.as_secs()));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        debug!("whisper-cli stderr: {}", stderr);
        return Err(MediaError::transcription_failed(
            "whisper-cli exited with a non-zero status",
            Some(stderr),
        ));
    }

    if !json_path.exists() {
        return Err(MediaError::transcription_failed(
            "whisper-cli did not produce an output transcript",
            None,
        ));
    }

    let raw = tokio::fs::read(&json_path).await?;
    let _ = tokio::fs::remove_file(&json_path).await;
    let parsed: WhisperOutput = serde_json::from_slice(&raw)?;

    let segments: Vec<TranscriptSegment> = parsed
        .segments
        .into_iter()
        .filter(|s| s.end > s.start)
        .map(|s| TranscriptSegment {
            start: s.start,
            end: s.end,
            text: s.text.trim().to_string(),
        })
        .collect();

    let language_detected = parsed
        .language
        .unwrap_or_else(|| language_hint.to_string());

    Ok(TranscriptionResult {
        segments,
        language_detected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_audio_file_is_rejected_before_spawning_whisper() {
        let result = transcribe("/nonexistent/audio.wav", "ja", DEFAULT_TRANSCRIBE_TIMEOUT).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
