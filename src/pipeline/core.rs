//! The composition root: one pipeline instance per process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::admission::{self, Decision, SubmitterState};
use crate::config::SchedulerConfig;
use crate::error::{JobError, PipelineError};
use crate::jobs::JobRegistry;
use crate::scheduler::{FairQueue, Submission};

use super::collaborators::{Messenger, Storage};

/// An accepted submission together with its routing context, queued for
/// serialized side effects (persist, then notify).
#[derive(Clone, Debug)]
pub struct AcceptedEntry {
    /// Channel the submission belongs to.
    pub channel: Arc<str>,
    /// Submitter who owns the entry.
    pub submitter: Arc<str>,
    /// The accepted submission.
    pub submission: Submission,
}

/// Routes submission requests through admission, fair scheduling, and the
/// per-submitter serialization queues.
///
/// One instance owns the fair queues of every channel it has seen, plus
/// references to the collaborators and the job-queue registry. The fair
/// queues sit behind one lock: scheduler operations are synchronous, so no
/// caller can observe a partially updated turn order. The serve operation
/// holds the lock across the `mark_served` write on purpose — the entry must
/// stay pending (and un-servable by anyone else) until storage confirms.
pub struct SubmissionPipeline {
    cfg: SchedulerConfig,
    storage: Arc<dyn Storage>,
    messenger: Arc<dyn Messenger>,
    registry: Arc<JobRegistry<AcceptedEntry>>,
    channels: RwLock<HashMap<Arc<str>, FairQueue>>,
}

impl SubmissionPipeline {
    /// Creates a pipeline over the given collaborators and registry.
    pub fn new(
        cfg: SchedulerConfig,
        storage: Arc<dyn Storage>,
        messenger: Arc<dyn Messenger>,
        registry: Arc<JobRegistry<AcceptedEntry>>,
    ) -> Self {
        Self {
            cfg,
            storage,
            messenger,
            registry,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Handles one submission request end to end.
    ///
    /// Loads the channel policy, evaluates admission, and on acceptance
    /// enqueues the entry into the channel's fair queue and routes the
    /// persist/notify side effects through the submitter's serialization
    /// queue. Rejections are returned as the [`Decision`] value (with
    /// rejection feedback posted), never as an error.
    pub async fn submit(
        &self,
        channel: &str,
        submitter: &str,
        link: &str,
        duration: Option<Duration>,
    ) -> Result<Decision, PipelineError> {
        let policy = self.storage.channel_policy(channel).await?;
        let candidate = Submission::now(link, duration);
        let state = self.submitter_state(channel, submitter).await?;

        let decision =
            admission::admit_at(submitter, &candidate, &state, &policy, candidate.created_at());
        if !decision.is_accepted() {
            tracing::debug!(
                channel,
                submitter,
                reason = decision.as_label(),
                "submission rejected"
            );
            self.messenger
                .notify_rejected(channel, submitter, &decision)
                .await?;
            return Ok(decision);
        }

        {
            let mut channels = self.channels.write().await;
            channels
                .entry(Arc::from(channel))
                .or_insert_with(|| FairQueue::new(self.cfg.history_retention))
                .enqueue(submitter, candidate.clone());
        }

        let jobs = self.registry.get_or_create(&queue_key(submitter, channel));
        if !jobs.has_worker() {
            let storage = Arc::clone(&self.storage);
            let messenger = Arc::clone(&self.messenger);
            jobs.process(move |entry: AcceptedEntry| {
                let storage = Arc::clone(&storage);
                let messenger = Arc::clone(&messenger);
                async move {
                    storage
                        .persist(&entry.channel, &entry.submitter, &entry.submission)
                        .await
                        .map_err(|e| JobError::new(e.to_string()))?;
                    messenger
                        .notify_accepted(&entry.channel, &entry.submission)
                        .await
                        .map_err(|e| JobError::new(e.to_string()))?;
                    Ok::<(), JobError>(())
                }
            });
            // No automatic retry: log the failure and keep draining. A bot
            // deployment that wants retries can release the queue and
            // install its own handler instead.
            jobs.on_error(move |err, entry: AcceptedEntry| async move {
                tracing::warn!(
                    error = %err,
                    channel = %entry.channel,
                    submitter = %entry.submitter,
                    link = entry.submission.link(),
                    "side effect failed; continuing with queued jobs"
                );
                true
            });
        }
        jobs.create_job(AcceptedEntry {
            channel: Arc::from(channel),
            submitter: Arc::from(submitter),
            submission: candidate,
        });

        tracing::debug!(channel, submitter, link, "submission accepted");
        Ok(Decision::Accepted)
    }

    /// Serves the next submission of a channel, if any.
    ///
    /// The served marker is written to storage **before** the scheduler
    /// commits, so a storage failure leaves the turn order and the entry
    /// untouched.
    pub async fn play_next(&self, channel: &str) -> Result<Option<Submission>, PipelineError> {
        let served = {
            let mut channels = self.channels.write().await;
            let Some(queue) = channels.get_mut(channel) else {
                return Ok(None);
            };
            let (submitter, next) = match (queue.peek(), queue.peek_submission()) {
                (Some(submitter), Some(next)) => (submitter.to_string(), next.clone()),
                _ => return Ok(None),
            };
            self.storage.mark_served(channel, &submitter, &next).await?;
            queue.serve_next()
        };

        match served {
            Some(submission) => {
                tracing::debug!(channel, link = submission.link(), "now serving");
                self.messenger.notify_served(channel, &submission).await?;
                Ok(Some(submission))
            }
            None => Ok(None),
        }
    }

    /// The submitter whose turn is next in a channel.
    pub async fn peek(&self, channel: &str) -> Option<String> {
        self.channels
            .read()
            .await
            .get(channel)
            .and_then(|q| q.peek().map(str::to_owned))
    }

    /// Number of pending submissions for a submitter in a channel.
    pub async fn pending_count(&self, channel: &str, submitter: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |q| q.pending_count(submitter))
    }

    /// Drops the serialization queue of a submitter+channel pair from the
    /// registry. Outstanding jobs on existing handles still drain.
    pub fn release_queue(&self, submitter: &str, channel: &str) -> bool {
        self.registry
            .release(&queue_key(submitter, channel))
            .is_some()
    }

    /// Reclaims submitters that no longer hold state worth keeping, across
    /// every channel this pipeline has seen.
    pub async fn sweep_idle(&self) {
        let mut channels = self.channels.write().await;
        for queue in channels.values_mut() {
            queue.sweep_idle();
        }
    }

    /// Builds the admission snapshot for a submitter, preferring the live
    /// scheduler and falling back to durable storage for submitters unseen
    /// this process lifetime.
    async fn submitter_state(
        &self,
        channel: &str,
        submitter: &str,
    ) -> Result<SubmitterState, PipelineError> {
        let local = {
            let channels = self.channels.read().await;
            channels
                .get(channel)
                .and_then(|q| q.submitter(submitter).map(|_| q.submitter_state(submitter)))
        };
        if let Some(state) = local {
            return Ok(state);
        }

        let pending = self.storage.pending_count(submitter, channel).await?;
        let latest = self.storage.latest_submission(submitter, channel).await?;
        Ok(SubmitterState {
            pending,
            latest: latest.map(|s| s.created_at()),
        })
    }
}

/// Serialization-group key for one submitter in one channel.
fn queue_key(submitter: &str, channel: &str) -> String {
    format!("{submitter}_{channel}")
}
