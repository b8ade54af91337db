//! The admission check itself: a pure function over candidate, state, policy.

use std::time::Instant;

use crate::config::ChannelPolicy;
use crate::scheduler::Submission;

use super::decision::Decision;

/// Snapshot of one submitter's standing at evaluation time.
///
/// Assembled by the caller (typically the pipeline) from the in-memory
/// scheduler, falling back to durable storage for submitters the scheduler
/// has not seen this process lifetime.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubmitterState {
    /// Number of currently pending submissions (history excluded).
    pub pending: u32,

    /// Timestamp of the submitter's latest submission: the newest pending
    /// entry, or, with nothing pending, the newest entry in history.
    /// `None` means the submitter has never submitted.
    pub latest: Option<Instant>,
}

/// Evaluates `candidate` against `policy`, reading the clock.
///
/// See [`admit_at`] for the clock-injected variant.
pub fn admit(
    submitter: &str,
    candidate: &Submission,
    state: &SubmitterState,
    policy: &ChannelPolicy,
) -> Decision {
    admit_at(submitter, candidate, state, policy, Instant::now())
}

/// Evaluates `candidate` against `policy` as of `now`.
///
/// Checks run in a fixed order; the first failure wins:
/// blacklist → quota → cooldown → duration cap.
pub fn admit_at(
    submitter: &str,
    candidate: &Submission,
    state: &SubmitterState,
    policy: &ChannelPolicy,
    now: Instant,
) -> Decision {
    if policy.blacklist.contains(submitter) {
        return Decision::Blacklisted;
    }

    if let Some(limit) = policy.max_pending {
        if state.pending >= limit {
            return Decision::QuotaExceeded { limit };
        }
    }

    if let (Some(cooldown), Some(latest)) = (policy.cooldown, state.latest) {
        let since = now.saturating_duration_since(latest);
        if since < cooldown {
            return Decision::CooldownActive {
                remaining: cooldown - since,
            };
        }
    }

    if let Some(limit) = policy.max_duration {
        // An unknown duration models a live/unbounded resource and
        // exceeds every configured cap.
        match candidate.duration() {
            Some(d) if d <= limit => {}
            _ => return Decision::TooLong { limit },
        }
    }

    Decision::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn candidate_at(t: Instant, duration: Option<Duration>) -> Submission {
        Submission::new("https://example.org/v/1", duration, t)
    }

    #[test]
    fn test_unrestricted_policy_accepts() {
        let t0 = Instant::now();
        let decision = admit_at(
            "alice",
            &candidate_at(t0, Some(Duration::from_secs(30))),
            &SubmitterState::default(),
            &ChannelPolicy::unrestricted(),
            t0,
        );
        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn test_cooldown_counts_down_from_latest_submission() {
        // 60s cooldown, previous entry at t0, next attempt 10s later.
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted().with_cooldown(Duration::from_secs(60));

        let first = admit_at(
            "alice",
            &candidate_at(t0, Some(Duration::from_secs(30))),
            &SubmitterState::default(),
            &policy,
            t0,
        );
        assert_eq!(first, Decision::Accepted);

        let state = SubmitterState {
            pending: 1,
            latest: Some(t0),
        };
        let retry = admit_at(
            "alice",
            &candidate_at(t0 + Duration::from_secs(10), Some(Duration::from_secs(30))),
            &state,
            &policy,
            t0 + Duration::from_secs(10),
        );
        assert_eq!(
            retry,
            Decision::CooldownActive {
                remaining: Duration::from_secs(50)
            }
        );
    }

    #[test]
    fn test_cooldown_never_blocks_first_submission() {
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted().with_cooldown(Duration::from_secs(3600));
        let decision = admit_at(
            "alice",
            &candidate_at(t0, Some(Duration::from_secs(30))),
            &SubmitterState {
                pending: 0,
                latest: None,
            },
            &policy,
            t0,
        );
        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn test_cooldown_elapsed_accepts() {
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted().with_cooldown(Duration::from_secs(60));
        let state = SubmitterState {
            pending: 0,
            latest: Some(t0),
        };
        let decision = admit_at(
            "alice",
            &candidate_at(t0 + Duration::from_secs(61), None),
            &state,
            &policy,
            t0 + Duration::from_secs(61),
        );
        assert_eq!(decision, Decision::Accepted);
    }

    #[test]
    fn test_quota_counts_only_pending() {
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted().with_max_pending(2);
        let state = SubmitterState {
            pending: 2,
            latest: Some(t0),
        };
        let decision = admit_at(
            "alice",
            &candidate_at(t0 + Duration::from_secs(1), Some(Duration::from_secs(30))),
            &state,
            &policy,
            t0 + Duration::from_secs(1),
        );
        assert_eq!(decision, Decision::QuotaExceeded { limit: 2 });
    }

    #[test]
    fn test_duration_cap_rejects_long_entry() {
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted().with_max_duration(Duration::from_secs(600));
        let decision = admit_at(
            "alice",
            &candidate_at(t0, Some(Duration::from_secs(601))),
            &SubmitterState::default(),
            &policy,
            t0,
        );
        assert_eq!(
            decision,
            Decision::TooLong {
                limit: Duration::from_secs(600)
            }
        );
    }

    #[test]
    fn test_duration_cap_rejects_unbounded_entry() {
        // Live streams carry no duration and exceed every cap.
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted().with_max_duration(Duration::from_secs(600));
        let decision = admit_at(
            "alice",
            &candidate_at(t0, None),
            &SubmitterState::default(),
            &policy,
            t0,
        );
        assert_eq!(
            decision,
            Decision::TooLong {
                limit: Duration::from_secs(600)
            }
        );
    }

    #[test]
    fn test_blacklist_wins_over_every_other_rejection() {
        // All four rules would reject; identity is checked first.
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted()
            .with_blacklisted("alice")
            .with_max_pending(1)
            .with_cooldown(Duration::from_secs(60))
            .with_max_duration(Duration::from_secs(10));
        let state = SubmitterState {
            pending: 5,
            latest: Some(t0),
        };
        let decision = admit_at("alice", &candidate_at(t0, None), &state, &policy, t0);
        assert_eq!(decision, Decision::Blacklisted);
    }

    #[test]
    fn test_quota_wins_over_cooldown_and_duration() {
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted()
            .with_max_pending(1)
            .with_cooldown(Duration::from_secs(60))
            .with_max_duration(Duration::from_secs(10));
        let state = SubmitterState {
            pending: 1,
            latest: Some(t0),
        };
        let decision = admit_at("bob", &candidate_at(t0, None), &state, &policy, t0);
        assert_eq!(decision, Decision::QuotaExceeded { limit: 1 });
    }

    #[test]
    fn test_cooldown_wins_over_duration() {
        let t0 = Instant::now();
        let policy = ChannelPolicy::unrestricted()
            .with_cooldown(Duration::from_secs(60))
            .with_max_duration(Duration::from_secs(10));
        let state = SubmitterState {
            pending: 0,
            latest: Some(t0),
        };
        let decision = admit_at(
            "bob",
            &candidate_at(t0 + Duration::from_secs(5), None),
            &state,
            &policy,
            t0 + Duration::from_secs(5),
        );
        assert_eq!(
            decision,
            Decision::CooldownActive {
                remaining: Duration::from_secs(55)
            }
        );
    }
}
