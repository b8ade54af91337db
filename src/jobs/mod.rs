//! # Keyed sequential job execution.
//!
//! This module provides the serialization primitive the pipeline uses for
//! per-submitter side effects:
//! - [`JobQueue`] — strictly ordered, strictly one-at-a-time execution of
//!   work items, with lifecycle hooks and an at-most-one error handler
//! - [`JobRegistry`] — get-or-create/release of queues by string key, so one
//!   queue exists per key
//!
//! ## Architecture
//! ```text
//! callers (any task)          one drain loop per queue
//!   create_job(item) ──┐
//!   create_job(item) ──┼──► pending list ──► worker(item).await ──► next
//!   create_jobs(..)  ──┘         │
//!                                └─ worker error:
//!                                     handler → true  → keep draining
//!                                     handler → false → drop the rest, finish
//!                                     no handler      → queue is defunct
//! ```
//!
//! ## Rules
//! - Items of one queue run strictly in enqueue order, never overlapping.
//! - Distinct keys are independent; their drain loops interleave freely.
//! - No mid-item cancellation: a started worker runs to completion.

mod queue;
mod registry;

pub use queue::JobQueue;
pub use registry::JobRegistry;
