//! Burned-in caption generation (ASS subtitle track fed to ffmpeg's
//! `subtitles=` filter).

use vclip_models::{SubtitleStyle, TranscriptSegment};

/// Maximum line width, in half-width-character equivalents (a full-width
/// glyph — e.g. most CJK characters — counts as 2).
const MAX_LINE_WIDTH: usize = 20;

/// Render the ASS document for one Selection range. `segments` must already
/// be clipped/intersected to `[range_start, range_end)`; timestamps inside
/// the document are relative to `range_start` since the Renderer always
/// operates on an already-trimmed clip.
pub fn build_ass_document(
    segments: &[TranscriptSegment],
    range_start: f64,
    range_end: f64,
    style: &SubtitleStyle,
) -> String {
    let mut doc = String::new();
    doc.push_str("[Script Info]\n");
    doc.push_str("ScriptType: v4.00+\n");
    doc.push_str("PlayResX: 1080\n");
    doc.push_str("PlayResY: 1920\n\n");

    doc.push_str("[V4+ Styles]\n");
    doc.push_str("Format: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, BackColour, Bold, Alignment, MarginL, MarginR, MarginV\n");
    doc.push_str(&format!(
        "Style: Default,{},{},{},{},&H00000000,0,2,60,60,120\n\n",
        style.font_family, style.font_size, style.fill_color, style.outline_color,
    ));

    doc.push_str("[Events]\n");
    doc.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for seg in segments {
        let clip_start = (seg.start - range_start).max(0.0);
        let clip_end = (seg.end - range_start).min(range_end - range_start);
        if clip_end <= clip_start {
            continue;
        }
        let text = wrap_lines(&seg.text).join("\\N");
        doc.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_timestamp(clip_start),
            format_ass_timestamp(clip_end),
            text
        ));
    }

    doc
}

/// `H:MM:SS.cc` as ASS timestamps require.
fn format_ass_timestamp(seconds: f64) -> String {
    let total_centis = (seconds.max(0.0) * 100.0).round() as u64;
    let centis = total_centis % 100;
    let total_secs = total_centis / 100;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;
    format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, centis)
}

/// Width of one character: 2 for characters outside the ASCII printable
/// range (the common case being full-width CJK text), 1 otherwise.
fn char_width(c: char) -> usize {
    if c.is_ascii() {
        1
    } else {
        2
    }
}

fn text_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Greedily wrap `text` into lines no wider than `MAX_LINE_WIDTH`
/// half-width-equivalents, breaking on whitespace boundaries where
/// possible and falling back to a hard character break otherwise.
pub fn wrap_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > 1 {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate) <= MAX_LINE_WIDTH {
                current = candidate;
            } else {
                if !current.is_empty() {
                    lines.push(current);
                }
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        return lines;
    }

    // No whitespace to break on (e.g. unsegmented Japanese) — hard-wrap by width.
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = char_width(c);
        if width + w > MAX_LINE_WIDTH && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
            width = 0;
        }
        current.push(c);
        width += w;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::SubtitleStyle;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn wraps_long_ascii_sentence_on_word_boundaries() {
        let lines = wrap_lines("this sentence is definitely longer than twenty characters wide");
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line) <= MAX_LINE_WIDTH);
        }
    }

    #[test]
    fn wraps_cjk_text_by_character_width() {
        let text = "これはとても長い日本語の字幕のテキストです";
        let lines = wrap_lines(text);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line) <= MAX_LINE_WIDTH);
        }
    }

    #[test]
    fn short_text_is_a_single_line() {
        assert_eq!(wrap_lines("hello there"), vec!["hello there".to_string()]);
    }

    #[test]
    fn ass_document_contains_clip_relative_timestamps() {
        let segments = vec![seg(100.0, 103.0, "hello world")];
        let doc = build_ass_document(&segments, 100.0, 130.0, &SubtitleStyle::default());
        assert!(doc.contains("Dialogue: 0,0:00:00.00,0:00:03.00"));
    }

    #[test]
    fn segments_outside_range_are_skipped() {
        let segments = vec![seg(0.0, 5.0, "before range")];
        let doc = build_ass_document(&segments, 100.0, 130.0, &SubtitleStyle::default());
        assert!(!doc.contains("before range"));
    }
}
