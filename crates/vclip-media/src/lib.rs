#![deny(unreachable_patterns)]
//! Media pipeline primitives: fetching source video, probing it, burning
//! captioned 9:16 clips, and transcribing audio with whisper.
//!
//! This crate provides:
//! - Source acquisition via yt-dlp (URL sources) and ffprobe-based usability
//!   checks shared with drive-backed sources
//! - Whisper-cli transcription into timed segments
//! - A type-safe FFmpeg command builder and runner with cancellation and
//!   timeout support
//! - The fixed 9:16 letterbox filter and ASS caption generation
//! - The Renderer orchestration tying the above into one clip encode

pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod probe;
pub mod progress;
pub mod render;
pub mod subtitles;
pub mod transcribe;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use download::{download_video, is_supported_url};
pub use error::{MediaError, MediaResult};
pub use filters::{build_render_filter, LETTERBOX_FILTER};
pub use probe::{get_duration, probe_video, VideoInfo, MAX_SOURCE_BYTES};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use render::{render_clip, render_timeout, RenderRequest};
pub use subtitles::{build_ass_document, wrap_lines};
pub use transcribe::{transcribe, TranscriptionResult, DEFAULT_TRANSCRIBE_TIMEOUT};
