//! # Per-channel policy and runtime configuration.
//!
//! Two knobs live here:
//! 1. **[`ChannelPolicy`]**: per-channel submission rules, owned by privileged
//!    moderation actions and read through the storage collaborator. The
//!    scheduler treats it as read-only.
//! 2. **[`SchedulerConfig`]**: process-level defaults for the scheduling core
//!    itself (history retention).
//!
//! ## Sentinel values
//! - `cooldown = None` → no cooldown between a submitter's accepted entries
//! - `max_pending = None` → unlimited simultaneously pending entries
//! - `max_duration = None` → no duration cap (live streams always pass)

use std::collections::HashSet;
use std::time::Duration;

/// Submission rules for one channel.
///
/// Evaluated by [`admit`](crate::admit) in a fixed order:
/// blacklist, quota, cooldown, duration cap. `None` disables a rule.
#[derive(Clone, Debug, Default)]
pub struct ChannelPolicy {
    /// Minimum time a submitter must wait between their own accepted
    /// submissions (`None` = no cooldown).
    pub cooldown: Option<Duration>,

    /// Maximum simultaneously pending submissions per submitter
    /// (`None` = unlimited). Counts only currently pending entries,
    /// never history.
    pub max_pending: Option<u32>,

    /// Maximum allowed duration for one submission (`None` = no cap).
    ///
    /// Submissions without a known duration (live/unbounded resources)
    /// exceed every configured cap.
    pub max_duration: Option<Duration>,

    /// Submitter ids forbidden from submitting.
    pub blacklist: HashSet<String>,
}

impl ChannelPolicy {
    /// Returns a policy with no restrictions (all sentinels).
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Returns a new policy with the given cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Returns a new policy with the given pending-entries quota.
    pub fn with_max_pending(mut self, max: u32) -> Self {
        self.max_pending = Some(max);
        self
    }

    /// Returns a new policy with the given duration cap.
    pub fn with_max_duration(mut self, max: Duration) -> Self {
        self.max_duration = Some(max);
        self
    }

    /// Returns a new policy with the given submitter added to the blacklist.
    pub fn with_blacklisted(mut self, submitter: impl Into<String>) -> Self {
        self.blacklist.insert(submitter.into());
        self
    }
}

/// Process-level configuration for the scheduling core.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// How long a served submission stays in a submitter's history.
    ///
    /// History only exists to answer "has this submitter played recently"
    /// (turn-order placement) and to back cooldown lookups. Entries older
    /// than this window are trimmed during serve operations; a submitter
    /// whose history fully ages out is treated as a newcomer again.
    pub history_retention: Duration,
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `history_retention = 300 minutes`
    fn default() -> Self {
        Self {
            history_retention: Duration::from_secs(300 * 60),
        }
    }
}
