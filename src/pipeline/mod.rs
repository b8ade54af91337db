//! # Submission pipeline: admission → fair scheduling → serialized side effects.
//!
//! This module wires the core together for one process:
//! - [`Storage`] / [`Messenger`] — the narrow async seams to the outside
//!   world (durable state, chat feedback)
//! - [`SubmissionPipeline`] — the composition root handling submit and
//!   serve requests
//! - [`AcceptedEntry`] — the work item routed through a per-submitter
//!   serialization queue
//!
//! ## Data flow
//! ```text
//! submit(channel, submitter, link, duration)
//!     │
//!     ├─► storage.channel_policy ──► admission check ──► rejected?
//!     │                                                    └─► notify_rejected
//!     ├─► FairQueue::enqueue (per channel)
//!     └─► JobRegistry["submitter_channel"] ──► persist ──► notify_accepted
//!                                              (strictly in arrival order)
//!
//! play_next(channel)
//!     └─► peek ──► storage.mark_served ──► FairQueue::serve_next ──► notify_served
//! ```

mod collaborators;
mod core;

pub use collaborators::{Messenger, Storage};
pub use core::{AcceptedEntry, SubmissionPipeline};
