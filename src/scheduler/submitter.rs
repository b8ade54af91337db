//! One identity known to the scheduler: a backlog plus a served history.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::submission::Submission;

/// A submitter's scheduling state inside one channel.
///
/// Created lazily on the first submission attempt; never destroyed by the
/// queue itself (see [`FairQueue::sweep_idle`](super::FairQueue::sweep_idle)
/// for reclamation).
///
/// - `local` is the pending backlog: pushed at the tail on acceptance and
///   popped at the tail when served (newest first within one submitter).
/// - `history` holds served submissions and exists only to answer "has this
///   submitter played recently" and to back cooldown lookups. Entries age
///   out by their creation timestamp.
#[derive(Clone, Debug)]
pub struct Submitter {
    id: Arc<str>,
    pub(super) local: Vec<Submission>,
    pub(super) history: Vec<Submission>,
}

impl Submitter {
    pub(super) fn new(id: Arc<str>) -> Self {
        Self {
            id,
            local: Vec::new(),
            history: Vec::new(),
        }
    }

    /// The submitter's opaque identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of pending submissions in the backlog.
    pub fn pending_len(&self) -> usize {
        self.local.len()
    }

    /// Number of retained (not yet aged-out) served submissions.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The submission that would be served next (the newest pending entry).
    pub fn next_pending(&self) -> Option<&Submission> {
        self.local.last()
    }

    /// Timestamp of the submitter's latest submission: the newest pending
    /// entry, or, with nothing pending, the newest entry in history.
    pub fn latest_submitted_at(&self) -> Option<Instant> {
        self.local
            .last()
            .map(Submission::created_at)
            .or_else(|| self.history.iter().map(Submission::created_at).max())
    }

    /// Whether any history entry is younger than `retention` as of `now`.
    ///
    /// Non-mutating; physical trimming happens in
    /// [`prune_history`](Self::prune_history) during serve operations.
    pub(super) fn has_played(&self, now: Instant, retention: Duration) -> bool {
        match now.checked_sub(retention) {
            Some(cutoff) => self.history.iter().any(|s| s.created_at() >= cutoff),
            // The retention window reaches past the representable origin,
            // so nothing has aged out yet.
            None => !self.history.is_empty(),
        }
    }

    /// Drops history entries older than `retention` as of `now`.
    pub(super) fn prune_history(&mut self, now: Instant, retention: Duration) {
        if let Some(cutoff) = now.checked_sub(retention) {
            self.history.retain(|s| s.created_at() >= cutoff);
        }
    }
}
