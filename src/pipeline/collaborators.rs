//! Async seams to the collaborators the scheduling core depends on.
//!
//! Both traits are deliberately narrow: the core never sees an ORM entity or
//! a chat API payload, only submissions and policies. Implementations live
//! with the surrounding bot (database layer, chat client); tests supply
//! in-memory fakes.

use async_trait::async_trait;

use crate::admission::Decision;
use crate::config::ChannelPolicy;
use crate::error::{MessagingError, StorageError};
use crate::scheduler::Submission;

/// Durable state the pipeline reads and writes.
///
/// All operations may fail; failures surface as
/// [`PipelineError::Storage`](crate::PipelineError::Storage) on the submit
/// and serve paths, or as job failures inside the serialization queue.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Loads the submission policy for a channel.
    async fn channel_policy(&self, channel: &str) -> Result<ChannelPolicy, StorageError>;

    /// Returns the submitter's most recent submission in a channel, if any.
    ///
    /// Consulted for cooldown checks when the in-memory scheduler has not
    /// seen the submitter this process lifetime.
    async fn latest_submission(
        &self,
        submitter: &str,
        channel: &str,
    ) -> Result<Option<Submission>, StorageError>;

    /// Counts the submitter's durably recorded pending entries in a channel.
    async fn pending_count(&self, submitter: &str, channel: &str) -> Result<u32, StorageError>;

    /// Records an accepted submission.
    async fn persist(
        &self,
        channel: &str,
        submitter: &str,
        submission: &Submission,
    ) -> Result<(), StorageError>;

    /// Records that a submission has been served.
    ///
    /// Called **before** the scheduler commits the serve, so a failure
    /// leaves the entry pending and recoverable.
    async fn mark_served(
        &self,
        channel: &str,
        submitter: &str,
        submission: &Submission,
    ) -> Result<(), StorageError>;
}

/// Chat feedback the pipeline posts after decisions.
///
/// Never invoked from inside the fair queue or the job queue; only the
/// pipeline talks to the messenger.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Posts acceptance feedback for a scheduled submission.
    async fn notify_accepted(
        &self,
        channel: &str,
        submission: &Submission,
    ) -> Result<(), MessagingError>;

    /// Posts rejection feedback carrying the admission decision.
    async fn notify_rejected(
        &self,
        channel: &str,
        submitter: &str,
        decision: &Decision,
    ) -> Result<(), MessagingError>;

    /// Posts now-playing feedback for a served submission.
    async fn notify_served(
        &self,
        channel: &str,
        submission: &Submission,
    ) -> Result<(), MessagingError>;
}
