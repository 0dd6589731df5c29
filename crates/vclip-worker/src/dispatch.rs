//! Dispatch loop: pulls ready job ids off the Registry's FIFO channel and
//! spawns one orchestrator task per job, bounded by the Registry's
//! concurrency semaphore.

use vclip_queue::{Dispatch, Registry};
use vclip_storage::RemoteStorage;
use tracing::warn;

use crate::config::WorkerConfig;
use crate::orchestrator::run_job;

/// Consume `dispatch.ready` until the Registry's sender side is dropped
/// (process shutdown). Each job acquires a concurrency permit before it
/// starts running, so at most `max_concurrent_jobs` orchestrator tasks are
/// active at once.
pub async fn run_dispatch_loop(mut dispatch: Dispatch, registry: Registry, storage: RemoteStorage) {
    let config = WorkerConfig::from_env();

    while let Some(job_id) = dispatch.ready.recv().await {
        let Some(request) = registry.get_request(&job_id).await else {
            warn!(job_id = %job_id, "dispatched job has no stored request, dropping");
            continue;
        };

        let permit = match dispatch.concurrency.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let registry = registry.clone();
        let storage = storage.clone();
        let config = config.clone();

        tokio::spawn(async move {
            let _permit = permit;
            run_job(job_id, request, registry, storage, config).await;
        });
    }
}
