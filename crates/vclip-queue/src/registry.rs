//! In-memory job registry and FIFO dispatch queue.
//!
//! Jobs never outlive the process: there is no persistence layer. A restart
//! loses in-flight and queued jobs, which is acceptable for this pipeline
//! since clients poll `GET /jobs/{job_id}` and can simply resubmit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock, Semaphore};
use tracing::{debug, info};
use vclip_models::{Job, JobId, JobRequest, JobStatus, Options};

use crate::error::{QueueError, QueueResult};

/// Default cap on jobs sitting in `queued`, past which `create` refuses new
/// submissions with `CapacityExceeded`.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 32;

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound on jobs actively being worked at once.
    pub max_concurrent_jobs: usize,
    /// Upper bound on jobs sitting in `queued` at once.
    pub max_queue_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
        }
    }
}

impl RegistryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_jobs: std::env::var("MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            max_queue_depth: std::env::var("MAX_QUEUE_DEPTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_QUEUE_DEPTH),
        }
    }
}

/// The dispatcher's half of the registry: a FIFO stream of job ids ready to
/// run, plus the semaphore bounding how many run at once.
pub struct Dispatch {
    pub ready: mpsc::UnboundedReceiver<JobId>,
    pub concurrency: Arc<Semaphore>,
}

/// Shared, in-memory store of job state plus a FIFO queue of newly created
/// and retried jobs.
#[derive(Clone)]
pub struct Registry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    requests: Arc<RwLock<HashMap<JobId, JobRequest>>>,
    ready_tx: mpsc::UnboundedSender<JobId>,
    concurrency: Arc<Semaphore>,
    max_queue_depth: usize,
}

impl Registry {
    /// Build a new registry and the dispatcher handle that consumes it.
    pub fn new(config: RegistryConfig) -> (Self, Dispatch) {
        let (ready_tx, ready_rx) = mpsc::unbounded_channel();
        let concurrency = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let registry = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            requests: Arc::new(RwLock::new(HashMap::new())),
            ready_tx,
            concurrency: concurrency.clone(),
            max_queue_depth: config.max_queue_depth,
        };
        let dispatch = Dispatch {
            ready: ready_rx,
            concurrency,
        };
        (registry, dispatch)
    }

    /// Create a job for a validated request, store both, and enqueue it for
    /// dispatch. Refuses with `CapacityExceeded` once `max_queue_depth` jobs
    /// are already sitting in `queued`.
    pub async fn create(&self, mut request: JobRequest) -> QueueResult<Job> {
        {
            let jobs = self.jobs.read().await;
            let queued = jobs.values().filter(|j| j.status == JobStatus::Queued).count();
            if queued >= self.max_queue_depth {
                return Err(QueueError::CapacityExceeded);
            }
        }

        request.options = request.options.normalized();

        let job = Job::new_queued();
        let job_id = job.job_id.clone();
        self.jobs.write().await.insert(job_id.clone(), job.clone());
        self.requests.write().await.insert(job_id.clone(), request);
        debug!(job_id = %job_id, "job queued");
        // The dispatcher always outlives the registry's senders in this
        // process, so a send failure here would mean the loop has already
        // exited; nothing left to do but drop the job on the floor.
        let _ = self.ready_tx.send(job_id);
        Ok(job)
    }

    /// Fetch a snapshot of the job's current state.
    pub async fn get(&self, job_id: &JobId) -> Option<Job> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Fetch the original submission for a job, consumed by the Worker to
    /// start processing. Retained for the job's whole lifetime so a retry
    /// can re-read the same request.
    pub async fn get_request(&self, job_id: &JobId) -> Option<JobRequest> {
        self.requests.read().await.get(job_id).cloned()
    }

    /// Mutate a job in place and bump its `updated_at`.
    pub async fn update<F>(&self, job_id: &JobId, mutate: F) -> QueueResult<Job>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| QueueError::JobNotFound(job_id.clone()))?;
        mutate(job);
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    /// Create a fresh job from a terminal one: same source, options merged
    /// with `options_override` if given. The original job is left exactly
    /// as it was — terminal status never changes — and the new job gets its
    /// own `job_id` and is enqueued independently.
    pub async fn create_retry(
        &self,
        job_id: &JobId,
        options_override: Option<Options>,
    ) -> QueueResult<Job> {
        {
            let jobs = self.jobs.read().await;
            let job = jobs
                .get(job_id)
                .ok_or_else(|| QueueError::JobNotFound(job_id.clone()))?;
            if !job.status.is_terminal() {
                return Err(QueueError::NotRetryable(job_id.clone()));
            }
        }

        let mut request = self
            .requests
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| QueueError::JobNotFound(job_id.clone()))?;

        if let Some(override_options) = options_override {
            request.options = override_options;
        }
        request.options = request.options.normalized();

        let new_job = self.create(request).await?;
        info!(job_id = %job_id, new_job_id = %new_job.job_id, "job retried with fresh id");
        Ok(new_job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclip_models::{ErrorKind, ErrorRecord, SourceType, Stage};

    fn sample_request() -> JobRequest {
        JobRequest {
            source_type: SourceType::Url,
            drive_file_id: None,
            source_url: Some("https://example.com/source.mp4".to_string()),
            title_hint: None,
            options: Options::default(),
        }
    }

    #[tokio::test]
    async fn create_inserts_and_enqueues_job() {
        let (registry, mut dispatch) = Registry::new(RegistryConfig::default());
        let job = registry.create(sample_request()).await.unwrap();
        let job_id = job.job_id.clone();

        assert_eq!(registry.get(&job_id).await.unwrap().status, JobStatus::Queued);
        assert!(registry.get_request(&job_id).await.is_some());
        assert_eq!(dispatch.ready.recv().await, Some(job_id));
    }

    #[tokio::test]
    async fn create_normalizes_target_count() {
        let (registry, _dispatch) = Registry::new(RegistryConfig::default());
        let mut request = sample_request();
        request.options.target_count = 1000;

        let job = registry.create(request).await.unwrap();
        let stored = registry.get_request(&job.job_id).await.unwrap();
        assert_eq!(stored.options.target_count, vclip_models::TARGET_COUNT_MAX);
    }

    #[tokio::test]
    async fn create_rejects_once_queue_depth_is_reached() {
        let (registry, _dispatch) = Registry::new(RegistryConfig {
            max_concurrent_jobs: 2,
            max_queue_depth: 1,
        });

        registry.create(sample_request()).await.unwrap();
        assert!(matches!(
            registry.create(sample_request()).await,
            Err(QueueError::CapacityExceeded)
        ));
    }

    #[tokio::test]
    async fn update_mutates_and_bumps_timestamp() {
        let (registry, _dispatch) = Registry::new(RegistryConfig::default());
        let job = registry.create(sample_request()).await.unwrap();
        let job_id = job.job_id.clone();
        let before = job.updated_at;

        let updated = registry
            .update(&job_id, |j| {
                j.status = JobStatus::Running;
                j.stage = Some(Stage::Fetching);
                j.progress = 0.05;
            })
            .await
            .unwrap();

        assert_eq!(updated.status, JobStatus::Running);
        assert!(updated.updated_at >= before);
    }

    #[tokio::test]
    async fn create_retry_only_allowed_from_terminal_status() {
        let (registry, _dispatch) = Registry::new(RegistryConfig::default());
        let job = registry.create(sample_request()).await.unwrap();
        let job_id = job.job_id.clone();

        assert!(matches!(
            registry.create_retry(&job_id, None).await,
            Err(QueueError::NotRetryable(_))
        ));

        registry
            .update(&job_id, |j| {
                j.status = JobStatus::Failed;
                j.error = Some(ErrorRecord::new(ErrorKind::EncoderFailed, "boom"));
            })
            .await
            .unwrap();

        let retried = registry.create_retry(&job_id, None).await.unwrap();

        assert_ne!(retried.job_id, job_id);
        assert_eq!(retried.status, JobStatus::Queued);
        assert_eq!(retried.progress, 0.0);
        assert!(retried.error.is_none());

        let original = registry.get(&job_id).await.unwrap();
        assert_eq!(original.status, JobStatus::Failed);
        assert!(original.error.is_some());
    }

    #[tokio::test]
    async fn create_retry_merges_options_override() {
        let (registry, _dispatch) = Registry::new(RegistryConfig::default());
        let job = registry.create(sample_request()).await.unwrap();
        let job_id = job.job_id.clone();
        registry
            .update(&job_id, |j| j.status = JobStatus::Done)
            .await
            .unwrap();

        let mut override_options = Options::default();
        override_options.target_count = 7;
        let retried = registry
            .create_retry(&job_id, Some(override_options))
            .await
            .unwrap();

        let stored = registry.get_request(&retried.job_id).await.unwrap();
        assert_eq!(stored.options.target_count, 7);
        assert_eq!(
            stored.source_url,
            registry.get_request(&job_id).await.unwrap().source_url
        );
    }

    #[tokio::test]
    async fn create_retry_rejects_unknown_job() {
        let (registry, _dispatch) = Registry::new(RegistryConfig::default());
        assert!(matches!(
            registry.create_retry(&JobId::new(), None).await,
            Err(QueueError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_missing_job_returns_none() {
        let (registry, _dispatch) = Registry::new(RegistryConfig::default());
        assert!(registry.get(&JobId::new()).await.is_none());
    }
}
