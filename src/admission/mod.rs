//! # Admission gate: policy checks before a submission enters scheduling.
//!
//! This module provides the pure decision function [`admit`] and its typed
//! outcome [`Decision`]. The gate never reads queue state on its own: callers
//! snapshot the submitter's situation into a [`SubmitterState`] and pass the
//! channel's [`ChannelPolicy`](crate::ChannelPolicy) alongside the candidate.
//!
//! ## Check order
//! Checks run in a fixed order and the first failing check wins:
//! 1. blacklist (identity, cheapest and most authoritative)
//! 2. quota (currently pending entries only)
//! 3. cooldown (elapsed time since the submitter's latest entry)
//! 4. duration cap (content, evaluated last — resolving a duration may have
//!    required an upstream network fetch)
//!
//! ## Rules
//! - Rejections are values, never errors.
//! - A submitter with no prior entry is never blocked by cooldown.
//! - An unknown duration (live/unbounded resource) exceeds every cap.

mod decision;
mod gate;

pub use decision::Decision;
pub use gate::{admit, admit_at, SubmitterState};
