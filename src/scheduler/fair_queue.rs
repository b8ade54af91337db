//! # Turn-order queue across submitters sharing one channel.
//!
//! [`FairQueue`] keeps one ordered sequence of *submitters* (not songs): the
//! turn order. Each submitter owns a private backlog and an age-pruned
//! history. The insertion rule favors submitters who have not played within
//! the retention window — a newcomer's first turn comes before any returning
//! submitter's next turn, while relative order is preserved among newcomers
//! and among returning submitters.
//!
//! ## Invariants
//! - No submitter id appears more than once in the turn order.
//! - A submitter sits in the turn order iff it has pending work (it may be
//!   transiently absent in the middle of a serve operation).
//!
//! ## Concurrency
//! `FairQueue` is plain owned state with synchronous methods; the owner
//! (one pipeline instance per channel map) serializes access. No operation
//! suspends, so no caller can observe a partially updated turn order.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::admission::SubmitterState;
use crate::config::SchedulerConfig;

use super::submission::Submission;
use super::submitter::Submitter;

/// Per-channel fair scheduler: turn order plus per-submitter state.
#[derive(Debug)]
pub struct FairQueue {
    /// Turn order; front is served next.
    turns: VecDeque<Arc<str>>,
    /// All submitters seen by this queue, keyed by id.
    submitters: HashMap<Arc<str>, Submitter>,
    /// History retention window used for aging and turn placement.
    retention: Duration,
}

impl Default for FairQueue {
    fn default() -> Self {
        Self::new(SchedulerConfig::default().history_retention)
    }
}

impl FairQueue {
    /// Creates an empty queue with the given history retention window.
    pub fn new(retention: Duration) -> Self {
        Self {
            turns: VecDeque::new(),
            submitters: HashMap::new(),
            retention,
        }
    }

    /// Accepts a submission into the submitter's backlog and places the
    /// submitter into the turn order if absent.
    ///
    /// Membership is idempotent: re-submitting while already queued only
    /// grows the backlog. Placement uses the submission's own creation
    /// timestamp as the aging reference, so the operation never reads the
    /// wall clock.
    pub fn enqueue(&mut self, id: &str, submission: Submission) {
        let now = submission.created_at();
        let key: Arc<str> = Arc::from(id);

        self.submitters
            .entry(Arc::clone(&key))
            .or_insert_with(|| Submitter::new(Arc::clone(&key)))
            .local
            .push(submission);

        if self.turns.iter().any(|t| t.as_ref() == id) {
            return;
        }

        let submitters = &self.submitters;
        let retention = self.retention;
        let returning = submitters
            .get(id)
            .is_some_and(|s| s.has_played(now, retention));

        if returning {
            self.turns.push_back(key);
            return;
        }

        // Newcomers go ahead of everyone who already played, but behind
        // newcomers that arrived earlier.
        let first_returning = self
            .turns
            .iter()
            .position(|t| submitters.get(t).is_some_and(|s| s.has_played(now, retention)));
        match first_returning {
            Some(i) => self.turns.insert(i, key),
            None => self.turns.push_back(key),
        }
    }

    /// Serves the next submission, reading the clock for history aging.
    ///
    /// See [`serve_next_at`](Self::serve_next_at) for the clock-injected
    /// variant.
    pub fn serve_next(&mut self) -> Option<Submission> {
        self.serve_next_at(Instant::now())
    }

    /// Serves the next submission as of `now`.
    ///
    /// Takes the submitter at the front of the turn order and pops the
    /// **tail** of their backlog (their newest pending entry). The served
    /// entry moves into history, aged-out history entries are trimmed, and
    /// the submitter rejoins the back of the line if work remains — their
    /// history is non-empty now, so they queue as a returning submitter.
    ///
    /// Returns `None` when the turn order is empty, or (defensively) when
    /// the front submitter has nothing pending.
    pub fn serve_next_at(&mut self, now: Instant) -> Option<Submission> {
        let id = self.turns.pop_front()?;
        let submitter = self.submitters.get_mut(&id)?;
        let served = submitter.local.pop()?;

        submitter.history.push(served.clone());
        submitter.prune_history(now, self.retention);

        if !submitter.local.is_empty() {
            self.turns.push_back(id);
        }
        Some(served)
    }

    /// The submitter whose turn is next, without mutating state.
    pub fn peek(&self) -> Option<&str> {
        self.turns.front().map(|t| t.as_ref())
    }

    /// The submission [`serve_next`](Self::serve_next) would return, without
    /// mutating state.
    pub fn peek_submission(&self) -> Option<&Submission> {
        let id = self.turns.front()?;
        self.submitters.get(id)?.next_pending()
    }

    /// Looks up a submitter by id.
    pub fn submitter(&self, id: &str) -> Option<&Submitter> {
        self.submitters.get(id)
    }

    /// Snapshot of a submitter's standing for admission checks.
    ///
    /// Unknown submitters yield the default (nothing pending, no latest
    /// timestamp); callers may then consult durable storage.
    pub fn submitter_state(&self, id: &str) -> SubmitterState {
        match self.submitters.get(id) {
            Some(s) => SubmitterState {
                pending: s.pending_len() as u32,
                latest: s.latest_submitted_at(),
            },
            None => SubmitterState::default(),
        }
    }

    /// Number of pending submissions for `id` (0 for unknown submitters).
    pub fn pending_count(&self, id: &str) -> usize {
        self.submitters.get(id).map_or(0, Submitter::pending_len)
    }

    /// Number of submitters currently holding a turn.
    pub fn turn_len(&self) -> usize {
        self.turns.len()
    }

    /// `true` when no submitter holds a turn.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Reclaims submitters with no pending work and a fully aged-out
    /// history, reading the clock.
    pub fn sweep_idle(&mut self) {
        self.sweep_idle_at(Instant::now());
    }

    /// Reclaims idle submitters as of `now`.
    ///
    /// A submitter holding a turn is never removed.
    pub fn sweep_idle_at(&mut self, now: Instant) {
        let turns = &self.turns;
        let retention = self.retention;
        self.submitters.retain(|id, s| {
            s.pending_len() > 0
                || s.has_played(now, retention)
                || turns.iter().any(|t| t == id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RETENTION: Duration = Duration::from_secs(60);

    fn sub(link: &str, at: Instant) -> Submission {
        Submission::new(link, Some(Duration::from_secs(180)), at)
    }

    fn served_links(q: &mut FairQueue, now: Instant) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(s) = q.serve_next_at(now) {
            out.push(s.link().to_string());
        }
        out
    }

    #[test]
    fn test_all_newcomers_serve_in_arrival_order() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            q.enqueue(id, sub(&format!("song-{id}"), t0 + Duration::from_secs(i as u64)));
        }
        assert_eq!(
            served_links(&mut q, t0 + Duration::from_secs(10)),
            vec!["song-a", "song-b", "song-c", "song-d"]
        );
    }

    #[test]
    fn test_double_submitter_interleaves_with_newest_first_backlog() {
        // a submits twice before b submits once. a's newest entry plays
        // first, then a rejoins the back of the line behind b.
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);
        q.enqueue("a", sub("a1", t0));
        q.enqueue("a", sub("a2", t0 + Duration::from_secs(1)));
        q.enqueue("b", sub("b1", t0 + Duration::from_secs(2)));

        assert_eq!(q.turn_len(), 2);
        assert_eq!(q.peek(), Some("a"));
        assert_eq!(
            served_links(&mut q, t0 + Duration::from_secs(10)),
            vec!["a2", "b1", "a1"]
        );
    }

    #[test]
    fn test_membership_is_idempotent() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);
        q.enqueue("a", sub("a1", t0));
        q.enqueue("a", sub("a2", t0 + Duration::from_secs(1)));
        q.enqueue("a", sub("a3", t0 + Duration::from_secs(2)));
        assert_eq!(q.turn_len(), 1);
        assert_eq!(q.pending_count("a"), 3);
    }

    #[test]
    fn test_newcomer_cuts_ahead_of_returning_submitter() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);

        // a plays once, then queues again: a is a returning submitter.
        q.enqueue("a", sub("a1", t0));
        assert!(q.serve_next_at(t0 + Duration::from_secs(1)).is_some());
        q.enqueue("a", sub("a2", t0 + Duration::from_secs(2)));
        assert_eq!(q.peek(), Some("a"));

        // b has never played: their first turn comes before a's next one.
        q.enqueue("b", sub("b1", t0 + Duration::from_secs(3)));
        assert_eq!(q.peek(), Some("b"));
        assert_eq!(
            served_links(&mut q, t0 + Duration::from_secs(10)),
            vec!["b1", "a2"]
        );
    }

    #[test]
    fn test_newcomers_keep_relative_order_among_themselves() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);

        q.enqueue("a", sub("a1", t0));
        assert!(q.serve_next_at(t0 + Duration::from_secs(1)).is_some());
        q.enqueue("a", sub("a2", t0 + Duration::from_secs(2)));

        q.enqueue("b", sub("b1", t0 + Duration::from_secs(3)));
        q.enqueue("c", sub("c1", t0 + Duration::from_secs(4)));

        // b and c both cut ahead of a, but c queues behind b.
        assert_eq!(
            served_links(&mut q, t0 + Duration::from_secs(10)),
            vec!["b1", "c1", "a2"]
        );
    }

    #[test]
    fn test_aged_out_history_restores_newcomer_treatment() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);

        // a plays at t0; that history entry ages out after RETENTION.
        q.enqueue("a", sub("a1", t0));
        assert!(q.serve_next_at(t0).is_some());

        // b plays recently and queues again: a live returning submitter.
        q.enqueue("b", sub("b1", t0 + Duration::from_secs(90)));
        assert!(q.serve_next_at(t0 + Duration::from_secs(100)).is_some());
        q.enqueue("b", sub("b2", t0 + Duration::from_secs(110)));
        assert_eq!(q.peek(), Some("b"));

        // At t0+120 a's only history entry (created at t0) is older than the
        // 60s window, so a counts as a newcomer again and cuts ahead of b.
        q.enqueue("a", sub("a2", t0 + Duration::from_secs(120)));
        assert_eq!(q.peek(), Some("a"));
    }

    #[test]
    fn test_recent_history_queues_behind_returning_cohort() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);

        q.enqueue("a", sub("a1", t0));
        assert!(q.serve_next_at(t0).is_some());

        q.enqueue("b", sub("b1", t0 + Duration::from_secs(5)));
        assert!(q.serve_next_at(t0 + Duration::from_secs(6)).is_some());
        q.enqueue("b", sub("b2", t0 + Duration::from_secs(10)));

        // a's history is still fresh at t0+30: plain back-of-the-line.
        q.enqueue("a", sub("a2", t0 + Duration::from_secs(30)));
        assert_eq!(
            served_links(&mut q, t0 + Duration::from_secs(40)),
            vec!["b2", "a2"]
        );
    }

    #[test]
    fn test_serve_on_empty_queue_returns_none() {
        let mut q = FairQueue::new(RETENTION);
        assert!(q.serve_next_at(Instant::now()).is_none());
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);
        q.enqueue("a", sub("a1", t0));
        q.enqueue("b", sub("b1", t0 + Duration::from_secs(1)));

        assert_eq!(q.peek(), Some("a"));
        assert_eq!(q.peek_submission().map(Submission::link), Some("a1"));
        assert_eq!(q.turn_len(), 2);
        assert_eq!(q.pending_count("a"), 1);
    }

    #[test]
    fn test_served_entries_feed_cooldown_lookup() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);
        q.enqueue("a", sub("a1", t0));
        assert!(q.serve_next_at(t0 + Duration::from_secs(1)).is_some());

        // Nothing pending, so the latest timestamp comes from history.
        let state = q.submitter_state("a");
        assert_eq!(state.pending, 0);
        assert_eq!(state.latest, Some(t0));
    }

    #[test]
    fn test_sweep_idle_reclaims_aged_out_submitters() {
        let t0 = Instant::now();
        let mut q = FairQueue::new(RETENTION);
        q.enqueue("a", sub("a1", t0));
        q.enqueue("b", sub("b1", t0 + Duration::from_secs(1)));
        assert!(q.serve_next_at(t0 + Duration::from_secs(2)).is_some());

        // a is served out and its history has aged; b still holds a turn.
        q.sweep_idle_at(t0 + Duration::from_secs(120));
        assert!(q.submitter("a").is_none());
        assert!(q.submitter("b").is_some());
        assert_eq!(q.turn_len(), 1);
    }

    proptest! {
        /// Random interleavings of enqueue/serve never duplicate a turn and
        /// never leave a submitter with pending work out of the turn order.
        #[test]
        fn prop_turn_order_invariants(ops in proptest::collection::vec((0u8..5, any::<bool>()), 1..80)) {
            let t0 = Instant::now();
            let mut q = FairQueue::new(RETENTION);

            for (step, (who, serve)) in ops.into_iter().enumerate() {
                let now = t0 + Duration::from_secs(step as u64);
                if serve {
                    let _ = q.serve_next_at(now);
                } else {
                    let id = format!("u{who}");
                    q.enqueue(&id, sub(&format!("s{step}"), now));
                }

                let mut seen = std::collections::HashSet::new();
                for t in &q.turns {
                    prop_assert!(seen.insert(t.clone()), "duplicate turn for {t}");
                    prop_assert!(
                        q.pending_count(t) > 0,
                        "turn held by {t} with empty backlog"
                    );
                }
                for (id, s) in &q.submitters {
                    if s.pending_len() > 0 {
                        prop_assert!(
                            q.turns.iter().any(|t| t == id),
                            "{id} has pending work but no turn"
                        );
                    }
                }
            }
        }
    }
}
