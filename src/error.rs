//! Error types used by the jukevisor pipeline and job queues.
//!
//! This module defines the error surface of the crate:
//!
//! - [`StorageError`] / [`MessagingError`] — failures raised by the external
//!   collaborators (durable storage, chat messaging).
//! - [`JobError`] — failure of one side-effecting job, handed to the queue's
//!   error handler.
//! - [`PipelineError`] — failures surfaced by [`SubmissionPipeline`](crate::SubmissionPipeline)
//!   operations.
//!
//! Admission rejections are **not** errors: they are returned as
//! [`Decision`](crate::Decision) values and never travel through these types.

use thiserror::Error;

/// Failure reported by the storage collaborator.
///
/// The scheduler core does not interpret the message; it only propagates it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("storage failure: {message}")]
pub struct StorageError {
    /// Backend-provided failure description.
    pub message: String,
}

impl StorageError {
    /// Creates a new storage error from any displayable source.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure reported by the messaging collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("messaging failure: {message}")]
pub struct MessagingError {
    /// Transport-provided failure description.
    pub message: String,
}

impl MessagingError {
    /// Creates a new messaging error from any displayable source.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of a single job executed by a [`JobQueue`](crate::JobQueue) worker.
///
/// Carried to the registered error handler together with the item that failed.
/// If no handler is registered the failure is fatal for that queue instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("job failed: {error}")]
pub struct JobError {
    /// The underlying error message.
    pub error: String,
}

impl JobError {
    /// Creates a new job error from any displayable source.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// # Errors produced by the submission pipeline.
///
/// These wrap collaborator failures observed while admitting, persisting, or
/// serving submissions. Rejections (blacklist, quota, cooldown, duration) are
/// returned as [`Decision`](crate::Decision) values instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Durable storage refused or failed an operation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The messaging collaborator failed to deliver a notification.
    #[error(transparent)]
    Messaging(#[from] MessagingError),
}

impl PipelineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PipelineError::Storage(_) => "storage_failure",
            PipelineError::Messaging(_) => "messaging_failure",
        }
    }
}
