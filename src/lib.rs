//! # jukevisor
//!
//! **Jukevisor** is the scheduling core of a community song-request bot:
//! admission-controlled, fair across submitters, and strictly ordered where
//! side effects are involved.
//!
//! It is deliberately free of any chat-platform or database code. The
//! surrounding bot supplies those through two narrow async traits and gets
//! back three guarantees:
//!
//! 1. **Admission**: every submission passes a fixed-order policy gate
//!    (blacklist → quota → cooldown → duration cap) before anything else
//!    happens. Rejections are typed values, not errors.
//! 2. **Fairness**: one turn order per channel, over *submitters* rather
//!    than songs. Newcomers get their first turn before any returning
//!    submitter's next turn; within one submitter's own backlog the newest
//!    entry plays first.
//! 3. **Ordered side effects**: per submitter+channel, persistence and
//!    notification jobs run strictly one at a time, in arrival order, no
//!    matter how many tasks submit concurrently.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     request ──► SubmissionPipeline
//!                      │
//!                      ├─► admission gate ──► rejected ──► notify_rejected
//!                      │    (pure check)
//!                      ▼
//!                 FairQueue (per channel)
//!                      │    turn order across submitters,
//!                      │    newest-first within one submitter
//!                      ▼
//!                 JobRegistry["<submitter>_<channel>"]
//!                      │
//!                      ▼
//!                 JobQueue drain loop (one per key)
//!                      │    persist ──► notify_accepted
//!                      ▼
//!                 Storage / Messenger collaborators
//! ```
//!
//! ### Serving
//! `play_next` pops the front of the turn order, serves that submitter's
//! newest pending entry, and re-queues them at the back if work remains.
//! The served marker is written to storage *before* the scheduler commits,
//! so a storage failure leaves the entry pending and recoverable.
//!
//! ## Concurrency model
//! Scheduler operations (enqueue, serve, admission) are synchronous and
//! never suspend, so no task can observe a half-updated turn order. The only
//! suspension point is the job queue's drain loop awaiting a worker; one
//! drain loop exists per key, guarded against concurrent starts. Distinct
//! keys interleave freely.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use jukevisor::{
//!     ChannelPolicy, Decision, JobRegistry, MessagingError, Messenger, SchedulerConfig,
//!     Storage, StorageError, Submission, SubmissionPipeline,
//! };
//!
//! struct Db;
//!
//! #[async_trait]
//! impl Storage for Db {
//!     async fn channel_policy(&self, _channel: &str) -> Result<ChannelPolicy, StorageError> {
//!         Ok(ChannelPolicy::unrestricted().with_cooldown(Duration::from_secs(60)))
//!     }
//!     async fn latest_submission(
//!         &self,
//!         _submitter: &str,
//!         _channel: &str,
//!     ) -> Result<Option<Submission>, StorageError> {
//!         Ok(None)
//!     }
//!     async fn pending_count(&self, _submitter: &str, _channel: &str) -> Result<u32, StorageError> {
//!         Ok(0)
//!     }
//!     async fn persist(
//!         &self,
//!         _channel: &str,
//!         _submitter: &str,
//!         _entry: &Submission,
//!     ) -> Result<(), StorageError> {
//!         Ok(())
//!     }
//!     async fn mark_served(
//!         &self,
//!         _channel: &str,
//!         _submitter: &str,
//!         _entry: &Submission,
//!     ) -> Result<(), StorageError> {
//!         Ok(())
//!     }
//! }
//!
//! struct Chat;
//!
//! #[async_trait]
//! impl Messenger for Chat {
//!     async fn notify_accepted(&self, channel: &str, entry: &Submission) -> Result<(), MessagingError> {
//!         println!("[{channel}] queued {}", entry.link());
//!         Ok(())
//!     }
//!     async fn notify_rejected(
//!         &self,
//!         channel: &str,
//!         submitter: &str,
//!         decision: &Decision,
//!     ) -> Result<(), MessagingError> {
//!         println!("[{channel}] {submitter}: {}", decision.as_label());
//!         Ok(())
//!     }
//!     async fn notify_served(&self, channel: &str, entry: &Submission) -> Result<(), MessagingError> {
//!         println!("[{channel}] now playing {}", entry.link());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = SubmissionPipeline::new(
//!         SchedulerConfig::default(),
//!         Arc::new(Db),
//!         Arc::new(Chat),
//!         JobRegistry::new(),
//!     );
//!
//!     let decision = pipeline
//!         .submit("lobby", "alice", "https://example.org/v/1", Some(Duration::from_secs(240)))
//!         .await?;
//!     assert!(decision.is_accepted());
//!
//!     if let Some(entry) = pipeline.play_next("lobby").await? {
//!         println!("serving {}", entry.link());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / functions                      |
//! |-----------------|----------------------------------------------------------|--------------------------------------------|
//! | **Admission**   | Fixed-order policy gate over submissions.                | [`admit`], [`Decision`], [`SubmitterState`]|
//! | **Scheduling**  | Per-channel fair turn order with aged history.           | [`FairQueue`], [`Submission`], [`Submitter`]|
//! | **Serialization** | Per-key ordered, non-overlapping job execution.        | [`JobQueue`], [`JobRegistry`]              |
//! | **Wiring**      | Composition root over the collaborator seams.            | [`SubmissionPipeline`], [`Storage`], [`Messenger`] |
//! | **Policy**      | Per-channel rules and runtime defaults.                  | [`ChannelPolicy`], [`SchedulerConfig`]     |
//! | **Errors**      | Typed collaborator and pipeline failures.                | [`PipelineError`], [`JobError`]            |

mod admission;
mod config;
mod error;
mod jobs;
mod pipeline;
mod scheduler;

// ---- Public re-exports ----

pub use admission::{admit, admit_at, Decision, SubmitterState};
pub use config::{ChannelPolicy, SchedulerConfig};
pub use error::{JobError, MessagingError, PipelineError, StorageError};
pub use jobs::{JobQueue, JobRegistry};
pub use pipeline::{AcceptedEntry, Messenger, Storage, SubmissionPipeline};
pub use scheduler::{FairQueue, Submission, Submitter};
