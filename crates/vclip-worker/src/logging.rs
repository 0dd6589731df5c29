//! Structured per-job logging. Every line carries `job_id`, `trace_id`, and
//! `stage` so a log aggregator can reconstruct one job's timeline without
//! string-parsing the message.

use tracing::{error, info, warn};
use vclip_models::{JobId, Stage, TraceId};

/// Job-scoped logger: constructed once per Worker run, re-stamped at each
/// stage transition.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    trace_id: String,
    stage: Option<Stage>,
}

impl JobLogger {
    pub fn new(job_id: &JobId, trace_id: &TraceId) -> Self {
        Self {
            job_id: job_id.to_string(),
            trace_id: trace_id.to_string(),
            stage: None,
        }
    }

    /// Return a copy scoped to a new stage, keeping job/trace identity.
    pub fn at_stage(&self, stage: Stage) -> Self {
        Self {
            stage: Some(stage),
            ..self.clone()
        }
    }

    pub fn info(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            trace_id = %self.trace_id,
            stage = self.stage.map(|s| s.as_str()),
            "{}", message
        );
    }

    pub fn warn(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            trace_id = %self.trace_id,
            stage = self.stage.map(|s| s.as_str()),
            "{}", message
        );
    }

    pub fn error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            trace_id = %self.trace_id,
            stage = self.stage.map(|s| s.as_str()),
            "{}", message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_stage_preserves_identity() {
        let job_id = JobId::new();
        let trace_id = TraceId::new();
        let logger = JobLogger::new(&job_id, &trace_id).at_stage(Stage::Fetching);
        assert_eq!(logger.job_id, job_id.to_string());
        assert_eq!(logger.stage, Some(Stage::Fetching));
    }
}
