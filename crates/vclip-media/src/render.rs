//! Renderer: burns one selected range into a 9:16 vertical clip with
//! optional captions.

use std::path::Path;
use std::time::Duration;

use vclip_models::{SelectionMethod, SelectionRange, SubtitleStyle, TranscriptSegment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::build_render_filter;
use crate::subtitles::build_ass_document;

/// Floor applied to the per-render timeout regardless of clip length.
const MIN_RENDER_TIMEOUT_SECS: u64 = 90;

/// The timeout scales with the clip's own duration past the floor.
const RENDER_TIMEOUT_MULTIPLIER: f64 = 3.0;

const VIDEO_FPS: &str = "30";
const AUDIO_SAMPLE_RATE: &str = "48000";

/// Everything the Renderer needs to produce one output file from one
/// Selection range.
pub struct RenderRequest<'a> {
    pub source_path: &'a Path,
    pub output_path: &'a Path,
    pub range: &'a SelectionRange,
    pub transcript: &'a [TranscriptSegment],
    pub subtitle_style: &'a SubtitleStyle,
    /// Directory the caption file (if any) gets written into; the caller
    /// owns cleanup.
    pub scratch_dir: &'a Path,
}

/// `max(90s, 3x range duration)`, per the Renderer's failure-classification
/// contract.
pub fn render_timeout(range_duration: f64) -> Duration {
    let secs = (range_duration * RENDER_TIMEOUT_MULTIPLIER).max(MIN_RENDER_TIMEOUT_SECS as f64);
    Duration::from_secs_f64(secs)
}

/// Render one clip: letterbox to 1080x1920, burn captions unless the range
/// came from the hard fallback strategy, encode H.264 High / AAC-LC, and
/// `+faststart` the output for progressive playback.
pub async fn render_clip(req: RenderRequest<'_>) -> MediaResult<()> {
    let duration = req.range.duration();
    let timeout = render_timeout(duration);

    let subtitles_path = if req.range.method == SelectionMethod::Fallback {
        None
    } else {
        let doc = build_ass_document(
            req.transcript,
            req.range.start,
            req.range.end,
            req.subtitle_style,
        );
        let path = req.scratch_dir.join("captions.ass");
        tokio::fs::write(&path, doc).await?;
        Some(path)
    };

    let filter = build_render_filter(
        subtitles_path
            .as_deref()
            .and_then(|p| p.to_str()),
    );

    let cmd = FfmpegCommand::new(req.source_path, req.output_path)
        .seek(req.range.start)
        .duration(duration)
        .video_filter(filter)
        .video_codec("libx264")
        .output_arg("-profile:v")
        .output_arg("high")
        .output_arg("-pix_fmt")
        .output_arg("yuv420p")
        .output_arg("-r")
        .output_arg(VIDEO_FPS)
        .audio_codec("aac")
        .audio_bitrate("128k")
        .output_arg("-ar")
        .output_arg(AUDIO_SAMPLE_RATE)
        .output_arg("-ac")
        .output_arg("2")
        .output_arg("-movflags")
        .output_arg("+faststart");

    let runner = FfmpegRunner::new().with_timeout(timeout.as_secs());
    runner.run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_respects_floor_for_short_clips() {
        assert_eq!(render_timeout(10.0), Duration::from_secs(90));
    }

    #[test]
    fn timeout_scales_for_long_clips() {
        assert_eq!(render_timeout(60.0), Duration::from_secs(180));
    }
}
