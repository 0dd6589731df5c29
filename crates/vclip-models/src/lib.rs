//! Shared data models for the shortclip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their lifecycle state
//! - Inbound job requests and the closed Options schema
//! - Transcript segments and Selector output
//! - Rendered/uploaded clip records
//! - The cross-crate error-kind taxonomy

pub mod clip;
pub mod error;
pub mod job;
pub mod options;
pub mod request;
pub mod transcript;

pub use clip::{clip_file_name, ClipOutput, ClipSegment};
pub use error::{ErrorKind, ErrorRecord};
pub use job::{Job, JobId, JobStatus, Stage, TraceId};
pub use options::{
    Options, SubtitleStyle, WhisperModel, MIN_GUARANTEED, TARGET_COUNT_MAX, TARGET_COUNT_MIN,
};
pub use request::{JobRequest, RequestValidationError, SourceType};
pub use transcript::{is_well_formed, Selection, SelectionMethod, SelectionRange, TranscriptSegment};
