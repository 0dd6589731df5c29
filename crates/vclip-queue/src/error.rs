//! Registry error types.

use thiserror::Error;
use vclip_models::JobId;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("job {0} is not retryable from its current status")]
    NotRetryable(JobId),

    #[error("registry is at capacity")]
    CapacityExceeded,
}
