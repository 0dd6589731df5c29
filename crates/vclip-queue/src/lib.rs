//! In-memory job registry and dispatch queue.
//!
//! This crate provides:
//! - An ephemeral `JobId -> Job` store, single process, no persistence
//! - A FIFO dispatch channel of newly created/retried jobs
//! - A semaphore bounding how many jobs run concurrently

pub mod error;
pub mod registry;

pub use error::{QueueError, QueueResult};
pub use registry::{Dispatch, Registry, RegistryConfig};
