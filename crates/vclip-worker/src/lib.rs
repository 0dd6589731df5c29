#![deny(unreachable_patterns)]
//! Video processing worker.
//!
//! This crate provides:
//! - The Selector's three falling-back strategies (LLM, rule-based, hard
//!   fallback) and their shared post-validation
//! - The Worker: one job's orchestration from fetch through upload, with
//!   the documented progress breakpoints and per-stage fallback policy
//! - The dispatch loop tying the Registry's FIFO queue to bounded
//!   concurrency via spawned orchestrator tasks
//! - Job-scoped structured logging

pub mod config;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod logging;
pub mod orchestrator;
pub mod selector;

pub use config::WorkerConfig;
pub use dispatch::run_dispatch_loop;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use orchestrator::run_job;
