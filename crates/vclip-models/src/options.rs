//! Closed, versioned option schema for job submissions.
//!
//! Options arrive as loose JSON on the wire; this module is the single
//! boundary where that JSON is validated and defaulted before anything
//! downstream ever sees an Options value.

use serde::{Deserialize, Serialize};

pub const TARGET_COUNT_MIN: u32 = 3;
pub const TARGET_COUNT_MAX: u32 = 8;
pub const DEFAULT_TARGET_COUNT: u32 = 5;
pub const DEFAULT_MIN_SEC: f64 = 25.0;
pub const DEFAULT_MAX_SEC: f64 = 45.0;
pub const DEFAULT_LANGUAGE: &str = "ja";

/// The minimum number of successful clips a Job must produce to reach `done`.
pub const MIN_GUARANTEED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WhisperModel {
    Tiny,
    #[default]
    Small,
    Base,
    Medium,
}

impl WhisperModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "tiny",
            WhisperModel::Base => "base",
            WhisperModel::Small => "small",
            WhisperModel::Medium => "medium",
        }
    }
}

/// Burned-in caption appearance. System-wide defaults, with a per-request
/// override limited to font size and color (see DESIGN.md Open Questions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStyle {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_outline_color")]
    pub outline_color: String,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
}

fn default_font_family() -> String {
    "Noto Sans".to_string()
}
fn default_font_size() -> u32 {
    54
}
fn default_outline_color() -> String {
    "&H00000000".to_string()
}
fn default_fill_color() -> String {
    "&H00FFFFFF".to_string()
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            outline_color: default_outline_color(),
            fill_color: default_fill_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default = "default_target_count")]
    pub target_count: u32,
    #[serde(default = "default_min_sec")]
    pub min_sec: f64,
    #[serde(default = "default_max_sec")]
    pub max_sec: f64,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub whisper_model: WhisperModel,
    #[serde(default)]
    pub force_rule_based: bool,
    #[serde(default)]
    pub subtitle_style: SubtitleStyle,
}

fn default_target_count() -> u32 {
    DEFAULT_TARGET_COUNT
}
fn default_min_sec() -> f64 {
    DEFAULT_MIN_SEC
}
fn default_max_sec() -> f64 {
    DEFAULT_MAX_SEC
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            min_sec: DEFAULT_MIN_SEC,
            max_sec: DEFAULT_MAX_SEC,
            language: DEFAULT_LANGUAGE.to_string(),
            whisper_model: WhisperModel::default(),
            force_rule_based: false,
            subtitle_style: SubtitleStyle::default(),
        }
    }
}

impl Options {
    /// Clamp `target_count` into `[TARGET_COUNT_MIN, TARGET_COUNT_MAX]` and
    /// reject a `min_sec > max_sec` combination.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_sec <= 0.0 {
            return Err("min_sec must be positive".to_string());
        }
        if self.min_sec > self.max_sec {
            return Err(format!(
                "min_sec ({}) must be <= max_sec ({})",
                self.min_sec, self.max_sec
            ));
        }
        Ok(())
    }

    /// Apply the documented clamp/default policy after `validate()` passes.
    pub fn normalized(mut self) -> Self {
        self.target_count = self.target_count.clamp(TARGET_COUNT_MIN, TARGET_COUNT_MAX);
        self
    }

    pub fn fallback_duration(&self) -> f64 {
        ((self.min_sec + self.max_sec) / 2.0).clamp(self.min_sec, self.max_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = Options::default();
        assert_eq!(opts.target_count, 5);
        assert_eq!(opts.min_sec, 25.0);
        assert_eq!(opts.max_sec, 45.0);
        assert_eq!(opts.language, "ja");
        assert_eq!(opts.whisper_model, WhisperModel::Small);
        assert!(!opts.force_rule_based);
    }

    #[test]
    fn target_count_clamps_into_range() {
        let opts = Options {
            target_count: 100,
            ..Options::default()
        }
        .normalized();
        assert_eq!(opts.target_count, TARGET_COUNT_MAX);

        let opts = Options {
            target_count: 0,
            ..Options::default()
        }
        .normalized();
        assert_eq!(opts.target_count, TARGET_COUNT_MIN);
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let opts = Options {
            min_sec: 50.0,
            max_sec: 30.0,
            ..Options::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn fallback_duration_is_clamped_midpoint() {
        let opts = Options::default();
        assert_eq!(opts.fallback_duration(), 35.0);
    }
}
