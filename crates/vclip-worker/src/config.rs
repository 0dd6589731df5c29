//! Worker configuration.

use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Hard wall-clock cap on one job, from fetch through the last upload.
    pub job_timeout: Duration,
    /// Wall-clock cap on the Transcriber's whisper-cli invocation.
    pub transcribe_timeout: Duration,
    /// Scratch root; each job gets `{tmp_dir}/{job_id}/`.
    pub tmp_dir: String,
    /// Endpoint for the single-turn JSON-mode LLM chat call Strategy A uses.
    pub llm_endpoint: String,
    /// Model name passed to the LLM endpoint.
    pub llm_model: String,
    /// API key for the LLM endpoint. Absent means Strategy A is skipped.
    pub llm_api_key: Option<String>,
    /// Wall-clock cap on the LLM HTTP call.
    pub llm_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(30 * 60),
            transcribe_timeout: Duration::from_secs(30 * 60),
            tmp_dir: "/tmp/shortclip".to_string(),
            llm_endpoint:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
                    .to_string(),
            llm_model: "gemini-2.5-flash".to_string(),
            llm_api_key: None,
            llm_timeout: Duration::from_secs(60),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            job_timeout: Duration::from_secs(
                std::env::var("WORKER_JOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.job_timeout.as_secs()),
            ),
            transcribe_timeout: Duration::from_secs(
                std::env::var("WORKER_TRANSCRIBE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.transcribe_timeout.as_secs()),
            ),
            tmp_dir: std::env::var("WORKER_TMP_DIR").unwrap_or(defaults.tmp_dir),
            llm_endpoint: std::env::var("LLM_ENDPOINT").unwrap_or(defaults.llm_endpoint),
            llm_model: std::env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_api_key: std::env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            llm_timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.llm_timeout.as_secs()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = WorkerConfig::default();
        assert_eq!(config.job_timeout, Duration::from_secs(1800));
        assert!(config.llm_api_key.is_none());
    }
}
