//! Rendered/uploaded clip output records.

use serde::{Deserialize, Serialize};

use crate::transcript::SelectionMethod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSegment {
    pub start: f64,
    pub end: f64,
}

/// One published short, as recorded in a Job's `outputs` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipOutput {
    pub file_name: String,
    pub remote_locator: String,
    pub duration_sec: f64,
    pub segment: ClipSegment,
    pub method: SelectionMethod,
}

/// Build the display name for the NN-th (1-based) clip of a job.
pub fn clip_file_name(title_hint: Option<&str>, index_one_based: usize) -> String {
    match title_hint {
        Some(hint) if !hint.trim().is_empty() => {
            format!("{}_{:02}.mp4", sanitize(hint), index_one_based)
        }
        _ => format!("clip_{:02}.mp4", index_one_based),
    }
}

fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_name_when_no_hint() {
        assert_eq!(clip_file_name(None, 1), "clip_01.mp4");
        assert_eq!(clip_file_name(Some("   "), 12), "clip_12.mp4");
    }

    #[test]
    fn uses_sanitized_title_hint() {
        assert_eq!(
            clip_file_name(Some("My Cool Talk!"), 3),
            "My_Cool_Talk__03.mp4"
        );
    }
}
