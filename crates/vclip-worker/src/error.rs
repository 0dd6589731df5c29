//! Worker error types, classified into the shared `ErrorKind` taxonomy so a
//! terminal Job failure carries the same structured record the HTTP surface
//! returns for a request error.

use thiserror::Error;
use vclip_models::ErrorKind;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("source unusable: {0}")]
    SourceUnusable(String),

    #[error("transcription failed: {0}")]
    TranscribeFailed(String),

    #[error("llm selection failed: {0}")]
    LlmFailed(String),

    #[error("render failed: {0}")]
    EncoderFailed(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("could not produce the minimum guaranteed clip count: {0}")]
    NoSegmentsProducible(String),

    #[error("job exceeded its wall-clock budget")]
    JobTimeout,

    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::SourceUnusable(_) => ErrorKind::SourceUnusable,
            WorkerError::TranscribeFailed(_) => ErrorKind::TranscribeFailed,
            WorkerError::LlmFailed(_) => ErrorKind::LlmFailed,
            WorkerError::EncoderFailed(_) => ErrorKind::EncoderFailed,
            WorkerError::UploadFailed(_) => ErrorKind::UploadFailed,
            WorkerError::NoSegmentsProducible(_) => ErrorKind::NoSegmentsProducible,
            WorkerError::JobTimeout => ErrorKind::JobTimeout,
            WorkerError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_the_documented_taxonomy() {
        assert_eq!(
            WorkerError::SourceUnusable("x".into()).kind(),
            ErrorKind::SourceUnusable
        );
        assert_eq!(WorkerError::JobTimeout.kind(), ErrorKind::JobTimeout);
    }
}
