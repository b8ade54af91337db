//! One request to occupy a playback slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

/// A single submission: an opaque resource link plus scheduling metadata.
///
/// Immutable once created. Ownership moves from the submitter's backlog into
/// their history when the entry is served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    link: Arc<str>,
    duration: Option<Duration>,
    created_at: Instant,
}

impl Submission {
    /// Creates a submission with an explicit creation timestamp.
    pub fn new(link: impl Into<Arc<str>>, duration: Option<Duration>, created_at: Instant) -> Self {
        Self {
            link: link.into(),
            duration,
            created_at,
        }
    }

    /// Creates a submission stamped with the current time.
    pub fn now(link: impl Into<Arc<str>>, duration: Option<Duration>) -> Self {
        Self::new(link, duration, Instant::now())
    }

    /// The opaque resource identifier (URL).
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Length of the requested resource; `None` for live/unbounded resources.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// When the submission was created; drives cooldown and history aging.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}
