//! Worker (C7): drives one job from source acquisition through upload,
//! publishing progress at the documented breakpoints and applying the
//! per-stage fallback policy.

use std::path::{Path, PathBuf};

use vclip_media::{
    command::{FfmpegCommand, FfmpegRunner},
    download_video, is_supported_url, probe_video, render_clip, transcribe, RenderRequest,
};
use vclip_models::{
    clip_file_name, ClipOutput, ClipSegment, ErrorRecord, JobId, JobRequest, SourceType, Stage,
    TranscriptSegment, MIN_GUARANTEED,
};
use vclip_queue::Registry;
use vclip_storage::{retry_async, RemoteStorage, RetryConfig};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::llm::LlmClient;
use crate::logging::JobLogger;
use crate::selector::select;

const JOBS_DONE_TOTAL: &str = "shortclip_jobs_done_total";
const JOBS_FAILED_TOTAL: &str = "shortclip_jobs_failed_total";
const JOBS_RUNNING: &str = "shortclip_jobs_running";

const FETCH_PROGRESS: f64 = 0.05;
const TRANSCRIBE_PROGRESS: f64 = 0.20;
const SELECT_PROGRESS: f64 = 0.45;
const RENDER_START_PROGRESS: f64 = 0.55;
const RENDER_END_PROGRESS: f64 = 0.90;
const UPLOAD_END_PROGRESS: f64 = 0.99;
const DONE_PROGRESS: f64 = 1.00;

/// Run a single job end to end within its wall-clock budget, updating the
/// Registry as it goes. Never returns an `Err` to the caller: terminal
/// failures are written into the Job itself.
pub async fn run_job(
    job_id: JobId,
    request: JobRequest,
    registry: Registry,
    storage: RemoteStorage,
    config: WorkerConfig,
) {
    let job = match registry.get(&job_id).await {
        Some(j) => j,
        None => return,
    };
    let log = JobLogger::new(&job_id, &job.trace_id);

    metrics::gauge!(JOBS_RUNNING).increment(1.0);
    let outcome = tokio::time::timeout(
        config.job_timeout,
        process(&job_id, &request, &registry, &storage, &config, &log),
    )
    .await;
    metrics::gauge!(JOBS_RUNNING).decrement(1.0);

    match outcome {
        Ok(Ok(())) => metrics::counter!(JOBS_DONE_TOTAL).increment(1),
        Ok(Err(err)) => {
            fail_job(&registry, &job_id, err, &log).await;
            metrics::counter!(JOBS_FAILED_TOTAL).increment(1);
        }
        Err(_) => {
            fail_job(&registry, &job_id, WorkerError::JobTimeout, &log).await;
            metrics::counter!(JOBS_FAILED_TOTAL).increment(1);
        }
    }

    let scratch_dir = scratch_dir(&config, &job_id);
    let _ = tokio::fs::remove_dir_all(&scratch_dir).await;
}

async fn fail_job(registry: &Registry, job_id: &JobId, err: WorkerError, log: &JobLogger) {
    log.error(&format!("job failed: {err}"));
    let kind = err.kind();
    let _ = registry
        .update(job_id, |job| {
            job.status = vclip_models::JobStatus::Failed;
            job.error = Some(ErrorRecord::new(kind, err.to_string()));
        })
        .await;
}

fn scratch_dir(config: &WorkerConfig, job_id: &JobId) -> PathBuf {
    Path::new(&config.tmp_dir).join(job_id.as_str())
}

async fn process(
    job_id: &JobId,
    request: &JobRequest,
    registry: &Registry,
    storage: &RemoteStorage,
    config: &WorkerConfig,
    log: &JobLogger,
) -> WorkerResult<()> {
    let scratch = scratch_dir(config, job_id);
    tokio::fs::create_dir_all(&scratch)
        .await
        .map_err(|e| WorkerError::Internal(format!("could not create scratch dir: {e}")))?;

    publish(registry, job_id, Stage::Fetching, FETCH_PROGRESS, None).await;
    let source_path = fetch_source(request, &scratch, storage, log).await?;

    let info = probe_video(&source_path)
        .await
        .map_err(|e| WorkerError::SourceUnusable(e.to_string()))?;
    info.is_usable().map_err(WorkerError::SourceUnusable)?;

    publish(registry, job_id, Stage::Transcribing, TRANSCRIBE_PROGRESS, None).await;
    let segments = transcribe_source(
        &source_path,
        &scratch,
        &request.options.language,
        config.transcribe_timeout,
        log,
    )
    .await;

    publish(registry, job_id, Stage::Selecting, SELECT_PROGRESS, None).await;
    let llm = config
        .llm_api_key
        .as_ref()
        .map(|key| LlmClient::new(&config.llm_endpoint, key, config.llm_timeout));
    let ranges = select(
        &segments,
        &request.options,
        info.duration,
        llm.as_ref(),
        log,
    )
    .await;

    if ranges.len() < MIN_GUARANTEED {
        return Err(WorkerError::NoSegmentsProducible(format!(
            "selector produced {} of the required {} ranges",
            ranges.len(),
            MIN_GUARANTEED
        )));
    }

    let mut outputs = Vec::new();
    let mut skip_notes = Vec::new();
    let clip_count = ranges.len();
    for (index, range) in ranges.iter().enumerate() {
        let render_progress = lerp(
            RENDER_START_PROGRESS,
            RENDER_END_PROGRESS,
            index as f64 / clip_count as f64,
        );
        publish(registry, job_id, Stage::Rendering, render_progress, None).await;

        let file_name = clip_file_name(request.title_hint.as_deref(), index + 1);
        let output_path = scratch.join(&file_name);

        let render_result = render_clip(RenderRequest {
            source_path: &source_path,
            output_path: &output_path,
            range,
            transcript: &segments,
            subtitle_style: &request.options.subtitle_style,
            scratch_dir: &scratch,
        })
        .await;

        if let Err(e) = render_result {
            let note = format!("skipped clip {}: render failed: {e}", index + 1);
            log.warn(&note);
            skip_notes.push(note);
            continue;
        }

        let upload_progress = lerp(
            RENDER_END_PROGRESS,
            UPLOAD_END_PROGRESS,
            index as f64 / clip_count as f64,
        );
        publish(registry, job_id, Stage::Uploading, upload_progress, None).await;

        let key = format!("clips/{}/{}", job_id.as_str(), file_name);
        let retry_config = RetryConfig::new("clip_upload");
        let jitter_seed = index as u32;
        let upload_result = retry_async(&retry_config, jitter_seed, || {
            storage.upload_file(&output_path, &key, "video/mp4")
        })
        .await;

        match upload_result {
            Ok(remote_locator) => outputs.push(ClipOutput {
                file_name: file_name.clone(),
                remote_locator,
                duration_sec: range.duration(),
                segment: ClipSegment {
                    start: range.start,
                    end: range.end,
                },
                method: range.method,
            }),
            Err(e) => {
                let note = format!("skipped clip {}: upload failed: {e}", index + 1);
                log.warn(&note);
                skip_notes.push(note);
            }
        }
    }

    if outputs.len() < MIN_GUARANTEED {
        return Err(WorkerError::NoSegmentsProducible(format!(
            "only {} of {} clips survived render/upload",
            outputs.len(),
            clip_count
        )));
    }

    let done_message = if skip_notes.is_empty() {
        None
    } else {
        Some(skip_notes.join("; "))
    };

    registry
        .update(job_id, |job| {
            job.status = vclip_models::JobStatus::Done;
            job.stage = Some(Stage::Done);
            job.progress = DONE_PROGRESS;
            job.outputs = outputs;
            job.message = done_message.clone();
        })
        .await
        .map_err(|e| WorkerError::Internal(e.to_string()))?;

    Ok(())
}

async fn publish(
    registry: &Registry,
    job_id: &JobId,
    stage: Stage,
    progress: f64,
    message: Option<&str>,
) {
    let message = message.map(str::to_string);
    let _ = registry
        .update(job_id, |job| {
            job.status = vclip_models::JobStatus::Running;
            job.stage = Some(stage);
            job.progress = progress;
            job.message = message;
        })
        .await;
}

fn lerp(start: f64, end: f64, fraction: f64) -> f64 {
    start + (end - start) * fraction.clamp(0.0, 1.0)
}

async fn fetch_source(
    request: &JobRequest,
    scratch: &Path,
    storage: &RemoteStorage,
    log: &JobLogger,
) -> WorkerResult<PathBuf> {
    let destination = scratch.join("source.mp4");
    let retry_config = RetryConfig::new("source_fetch");

    match request.source_type {
        SourceType::Url => {
            let url = request
                .source_url
                .as_deref()
                .ok_or_else(|| WorkerError::SourceUnusable("missing source_url".to_string()))?;
            if !is_supported_url(url) {
                return Err(WorkerError::SourceUnusable(format!(
                    "unsupported source url: {url}"
                )));
            }
            log.info(&format!("fetching source from {url}"));
            retry_async(&retry_config, 0, || download_video(url, &destination))
                .await
                .map_err(|e| WorkerError::SourceUnusable(e.to_string()))?;
        }
        SourceType::Drive => {
            let key = request
                .drive_file_id
                .as_deref()
                .ok_or_else(|| WorkerError::SourceUnusable("missing drive_file_id".to_string()))?;
            log.info(&format!("fetching source from drive key {key}"));
            retry_async(&retry_config, 0, || storage.download_file(key, &destination))
                .await
                .map_err(|e| WorkerError::SourceUnusable(e.to_string()))?;
        }
    }

    Ok(destination)
}

async fn extract_audio(source_path: &Path, scratch: &Path) -> WorkerResult<PathBuf> {
    let audio_path = scratch.join("audio.wav");
    let cmd = FfmpegCommand::new(source_path, &audio_path)
        .output_arg("-vn")
        .audio_codec("pcm_s16le")
        .output_arg("-ar")
        .output_arg("16000")
        .output_arg("-ac")
        .output_arg("1");
    let runner = FfmpegRunner::new().with_timeout(600);
    runner
        .run(&cmd)
        .await
        .map_err(|e| WorkerError::TranscribeFailed(format!("audio extraction failed: {e}")))?;
    Ok(audio_path)
}

async fn transcribe_source(
    source_path: &Path,
    scratch: &Path,
    language: &str,
    timeout: std::time::Duration,
    log: &JobLogger,
) -> Vec<TranscriptSegment> {
    let audio_path = match extract_audio(source_path, scratch).await {
        Ok(path) => path,
        Err(e) => {
            log.warn(&format!("{e}, continuing with empty transcript"));
            return Vec::new();
        }
    };

    match transcribe(&audio_path, language, timeout).await {
        Ok(result) => result.segments,
        Err(e) => {
            log.warn(&format!("transcription failed: {e}, continuing with empty transcript"));
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_interpolates_within_bounds() {
        assert_eq!(lerp(0.55, 0.90, 0.0), 0.55);
        assert_eq!(lerp(0.55, 0.90, 1.0), 0.90);
        assert!((lerp(0.55, 0.90, 0.5) - 0.725).abs() < 1e-9);
    }
}
