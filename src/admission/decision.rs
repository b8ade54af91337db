//! Typed outcome of an admission check.

use std::time::Duration;

/// Outcome of evaluating a submission candidate against channel policy.
///
/// Exactly one variant is returned per evaluation; when several rules would
/// reject, the one earliest in the check order is reported. User-facing
/// messaging keys off the variant, so callers should not collapse them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The submission passed every check and may be scheduled.
    Accepted,

    /// The submitter is blacklisted in this channel.
    Blacklisted,

    /// The submitter already has the maximum number of pending entries.
    QuotaExceeded {
        /// The configured per-submitter quota.
        limit: u32,
    },

    /// The submitter's cooldown has not elapsed yet.
    CooldownActive {
        /// Time left until the submitter may submit again.
        remaining: Duration,
    },

    /// The candidate is longer than the channel allows.
    TooLong {
        /// The configured duration cap.
        limit: Duration,
    },
}

impl Decision {
    /// Returns `true` for [`Decision::Accepted`].
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jukevisor::Decision;
    ///
    /// assert_eq!(Decision::Accepted.as_label(), "accepted");
    /// assert_eq!(Decision::Blacklisted.as_label(), "blacklisted");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::Blacklisted => "blacklisted",
            Decision::QuotaExceeded { .. } => "quota_exceeded",
            Decision::CooldownActive { .. } => "cooldown_active",
            Decision::TooLong { .. } => "too_long",
        }
    }
}
