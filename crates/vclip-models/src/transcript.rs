//! Transcript and selection types shared by the Transcriber and Selector.

use serde::{Deserialize, Serialize};

/// One timed span of recognized speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Verify the `0 ≤ start < end` and pairwise-monotonic invariants hold.
pub fn is_well_formed(segments: &[TranscriptSegment]) -> bool {
    for seg in segments {
        if !(seg.start >= 0.0 && seg.start < seg.end) {
            return false;
        }
    }
    segments.windows(2).all(|w| w[0].end <= w[1].start)
}

/// Which of the three strategies produced a Selection range or ClipOutput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    Llm,
    Rule,
    Fallback,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMethod::Llm => "llm",
            SelectionMethod::Rule => "rule",
            SelectionMethod::Fallback => "fallback",
        }
    }
}

/// A single chosen time range, tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: f64,
    pub end: f64,
    pub method: SelectionMethod,
}

impl SelectionRange {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &SelectionRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Ordered, non-overlapping output of the Selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub ranges: Vec<SelectionRange>,
}

impl Selection {
    pub fn is_chronological_and_non_overlapping(&self) -> bool {
        self.ranges.windows(2).all(|w| w[0].end <= w[1].start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: "hello".to_string(),
        }
    }

    #[test]
    fn well_formed_requires_monotonic_non_overlap() {
        assert!(is_well_formed(&[seg(0.0, 1.0), seg(1.0, 2.0)]));
        assert!(!is_well_formed(&[seg(0.0, 1.5), seg(1.0, 2.0)]));
        assert!(!is_well_formed(&[seg(1.0, 1.0)]));
    }

    #[test]
    fn empty_transcript_is_well_formed() {
        assert!(is_well_formed(&[]));
    }

    #[test]
    fn ranges_overlap_detection() {
        let a = SelectionRange {
            start: 0.0,
            end: 10.0,
            method: SelectionMethod::Rule,
        };
        let b = SelectionRange {
            start: 9.0,
            end: 20.0,
            method: SelectionMethod::Rule,
        };
        let c = SelectionRange {
            start: 10.0,
            end: 20.0,
            method: SelectionMethod::Rule,
        };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
