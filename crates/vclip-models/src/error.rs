//! The error-kind taxonomy shared across the HTTP surface, the Registry, and
//! Job snapshots. Stage-local errors are caught by the Worker; only
//! terminal-classified kinds ever set `Job.status = failed`.

use serde::{Deserialize, Serialize};

use crate::job::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    NotFound,
    SourceUnusable,
    TranscribeFailed,
    LlmFailed,
    EncoderFailed,
    UploadFailed,
    NoSegmentsProducible,
    JobTimeout,
    InternalError,
}

impl ErrorKind {
    /// True for kinds that terminate the owning Job as `failed` outright,
    /// as opposed to stage-local kinds the Worker may fall back around.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ErrorKind::SourceUnusable
                | ErrorKind::NoSegmentsProducible
                | ErrorKind::JobTimeout
                | ErrorKind::InternalError
        )
    }
}

/// The structured shape every `Job.error` (and every 4xx/5xx API body) uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_terminal_kinds() {
        assert!(ErrorKind::JobTimeout.is_terminal());
        assert!(ErrorKind::NoSegmentsProducible.is_terminal());
        assert!(!ErrorKind::TranscribeFailed.is_terminal());
        assert!(!ErrorKind::LlmFailed.is_terminal());
    }
}
