//! # Example: Submission Flow
//!
//! Wires the pipeline to in-memory collaborators and walks through a round
//! of submissions: acceptances, every rejection kind, and fair serving.
//!
//! Run with: `cargo run --example submission_flow`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use jukevisor::{
    ChannelPolicy, Decision, JobRegistry, Messenger, MessagingError, SchedulerConfig, Storage,
    StorageError, Submission, SubmissionPipeline,
};

/// In-memory stand-in for the bot's database layer.
struct MemoryStore {
    policy: ChannelPolicy,
    entries: Mutex<Vec<String>>,
}

#[async_trait]
impl Storage for MemoryStore {
    async fn channel_policy(&self, _channel: &str) -> Result<ChannelPolicy, StorageError> {
        Ok(self.policy.clone())
    }

    async fn latest_submission(
        &self,
        _submitter: &str,
        _channel: &str,
    ) -> Result<Option<Submission>, StorageError> {
        Ok(None)
    }

    async fn pending_count(&self, _submitter: &str, _channel: &str) -> Result<u32, StorageError> {
        Ok(0)
    }

    async fn persist(
        &self,
        _channel: &str,
        submitter: &str,
        submission: &Submission,
    ) -> Result<(), StorageError> {
        self.entries
            .lock()
            .push(format!("{submitter} -> {}", submission.link()));
        Ok(())
    }

    async fn mark_served(
        &self,
        _channel: &str,
        submitter: &str,
        submission: &Submission,
    ) -> Result<(), StorageError> {
        println!("[store] served marker: {submitter} -> {}", submission.link());
        Ok(())
    }
}

/// Prints what the bot would post back to the chat.
struct ConsoleMessenger;

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn notify_accepted(
        &self,
        channel: &str,
        submission: &Submission,
    ) -> Result<(), MessagingError> {
        println!("[{channel}] queued {}", submission.link());
        Ok(())
    }

    async fn notify_rejected(
        &self,
        channel: &str,
        submitter: &str,
        decision: &Decision,
    ) -> Result<(), MessagingError> {
        println!("[{channel}] {submitter}: request denied ({})", decision.as_label());
        Ok(())
    }

    async fn notify_served(
        &self,
        channel: &str,
        submission: &Submission,
    ) -> Result<(), MessagingError> {
        println!("[{channel}] now playing {}", submission.link());
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore {
        policy: ChannelPolicy::unrestricted()
            .with_max_pending(2)
            .with_max_duration(Duration::from_secs(600))
            .with_blacklisted("spammer"),
        entries: Mutex::new(Vec::new()),
    });
    let pipeline = SubmissionPipeline::new(
        SchedulerConfig::default(),
        Arc::clone(&store) as Arc<dyn Storage>,
        Arc::new(ConsoleMessenger),
        JobRegistry::new(),
    );

    // alice stacks two songs before bob shows up with one.
    for (submitter, link, duration) in [
        ("alice", "https://tube.example/alice-first", 240),
        ("alice", "https://tube.example/alice-second", 180),
        ("bob", "https://tube.example/bob-first", 300),
    ] {
        let decision = pipeline
            .submit("lobby", submitter, link, Some(Duration::from_secs(duration)))
            .await?;
        println!("[main] {submitter} submitted: {}", decision.as_label());
    }

    // Every policy rule in action.
    let over_quota = pipeline
        .submit("lobby", "alice", "https://tube.example/alice-third", Some(Duration::from_secs(60)))
        .await?;
    println!("[main] alice third submission: {}", over_quota.as_label());

    let too_long = pipeline
        .submit("lobby", "carol", "https://tube.example/carol-marathon", Some(Duration::from_secs(7200)))
        .await?;
    println!("[main] carol marathon: {}", too_long.as_label());

    let banned = pipeline
        .submit("lobby", "spammer", "https://tube.example/spam", Some(Duration::from_secs(10)))
        .await?;
    println!("[main] spammer: {}", banned.as_label());

    // Let the persistence jobs drain before serving.
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("[store] persisted entries: {:?}", store.entries.lock());

    // alice submitted first, so she opens — with her newest entry. Then she
    // rejoins the back of the line and bob gets his turn before her older
    // entry plays.
    while let Some(submission) = pipeline.play_next("lobby").await? {
        println!("[main] served {}", submission.link());
    }

    println!("[main] finished");
    Ok(())
}
