//! # Fair turn-order scheduling across submitters sharing one channel.
//!
//! This module contains the scheduling data model and the per-channel
//! [`FairQueue`]:
//! - [`Submission`] — one request to occupy a playback slot
//! - [`Submitter`] — an identity owning a backlog of pending submissions and
//!   an age-pruned history of served ones
//! - [`FairQueue`] — the turn order across submitters plus the serve operation
//!
//! ## Architecture
//! ```text
//! enqueue(id, submission)
//!     │
//!     ├─► submitter backlog (tail push)
//!     └─► turn order (idempotent membership):
//!           newcomer          → ahead of everyone who has played
//!           has played before → back of the line
//!
//! serve_next()
//!     │
//!     ├─► pop front of turn order
//!     ├─► pop that submitter's backlog TAIL (their newest entry)
//!     ├─► move it to history, trim aged-out history entries
//!     └─► submitter still has pending work → re-append at turn tail
//! ```
//!
//! ## Rules
//! - A submitter id never appears twice in the turn order.
//! - Within one submitter's own backlog, the newest entry is served first;
//!   across submitters, turn order governs. The asymmetry is deliberate and
//!   observable, not a bug to "fix".

mod fair_queue;
mod submission;
mod submitter;

pub use fair_queue::FairQueue;
pub use submission::Submission;
pub use submitter::Submitter;
