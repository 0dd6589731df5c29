//! FFmpeg filter construction for the 9:16 letterboxed render contract.

/// Scale the source to fit width 1080 preserving aspect ratio, then pad to
/// exactly 1080x1920 with centered black letterbox bars. No cropping.
pub const LETTERBOX_FILTER: &str =
    "scale=1080:-2:force_original_aspect_ratio=decrease,scale=trunc(iw/2)*2:trunc(ih/2)*2,pad=1080:1920:(ow-iw)/2:(oh-ih)/2:color=black";

/// Build the video filter chain for one clip: the fixed letterbox, plus an
/// optional subtitle burn-in filter appended after it (ffmpeg evaluates
/// filters left to right, so subtitles land on top of the padded frame).
pub fn build_render_filter(subtitles_path: Option<&str>) -> String {
    match subtitles_path {
        Some(path) => format!("{},subtitles={}", LETTERBOX_FILTER, escape_filter_path(path)),
        None => LETTERBOX_FILTER.to_string(),
    }
}

/// Escape a path for embedding inside an ffmpeg filtergraph argument, where
/// `:`, `'` and `\` are filtergraph metacharacters.
fn escape_filter_path(path: &str) -> String {
    let escaped = path
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'");
    format!("'{}'", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subtitles_is_plain_letterbox() {
        assert_eq!(build_render_filter(None), LETTERBOX_FILTER);
    }

    #[test]
    fn subtitles_filter_is_appended() {
        let filter = build_render_filter(Some("/tmp/job1/captions.ass"));
        assert!(filter.starts_with(LETTERBOX_FILTER));
        assert!(filter.contains("subtitles="));
        assert!(filter.contains("captions.ass"));
    }

    #[test]
    fn colon_in_path_is_escaped() {
        let escaped = escape_filter_path("C:/tmp/captions.ass");
        assert!(escaped.contains("\\:"));
    }
}
