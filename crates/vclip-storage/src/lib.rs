//! S3-compatible remote storage client.
//!
//! This crate provides:
//! - Fetching a source video by its `drive_file_id` object key
//! - Uploading rendered clips and returning their remote locator
//! - Exponential backoff with jitter shared by the Fetcher and Uploader

pub mod client;
pub mod error;
pub mod retry;

pub use client::{RemoteStorage, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use retry::{retry_async, RetryConfig};
