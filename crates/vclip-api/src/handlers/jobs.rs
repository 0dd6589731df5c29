//! Job lifecycle handlers: submit, poll, and retry.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use vclip_models::{Job, JobId, JobRequest, Options};

use crate::auth::Authenticated;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: String,
    pub trace_id: String,
    pub status: String,
}

impl From<Job> for CreateJobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id.to_string(),
            trace_id: job.trace_id.to_string(),
            status: job.status.as_str().to_string(),
        }
    }
}

/// `POST /jobs`: validate the submission and hand it to the Registry.
/// The caller never blocks on the pipeline; this returns 201 once the job
/// has a slot in the queue, or 429 if the queue is already at capacity.
pub async fn create_job(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(request): Json<JobRequest>,
) -> ApiResult<(StatusCode, Json<CreateJobResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job = state.registry.create(request).await?;
    info!(job_id = %job.job_id, "job accepted");
    metrics::record_job_created();

    Ok((StatusCode::CREATED, Json(job.into())))
}

/// `GET /jobs/{job_id}`: the full current snapshot, including progress,
/// stage, outputs once done, and the structured error once failed.
pub async fn get_job(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job_id = JobId::from_string(job_id);
    let job = state
        .registry
        .get(&job_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("job not found: {job_id}")))?;

    Ok(Json(job))
}

#[derive(Debug, Default, Deserialize)]
pub struct RetryJobRequest {
    #[serde(default)]
    pub options: Option<Options>,
}

/// `POST /jobs/{job_id}/retry`: create a new job from a terminal one, sharing
/// its source reference and merging `options` if given. Rejected with 409
/// if the referenced job is not yet terminal, 404 for unknown job ids.
/// Returns 201 with the new job's `{job_id, status:"queued"}` — the original
/// job is untouched.
pub async fn retry_job(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(job_id): Path<String>,
    body: Option<Json<RetryJobRequest>>,
) -> ApiResult<(StatusCode, Json<CreateJobResponse>)> {
    let job_id = JobId::from_string(job_id);
    let options_override = body.and_then(|Json(b)| b.options);
    let job = state.registry.create_retry(&job_id, options_override).await?;
    info!(old_job_id = %job_id, new_job_id = %job.job_id, "job retried");
    metrics::record_job_created();

    Ok((StatusCode::CREATED, Json(job.into())))
}
