//! Keyed registry of job queues.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::queue::JobQueue;

/// Hands out one [`JobQueue`] per string key.
///
/// The registry is explicit shared state: construct one, share it via `Arc`,
/// and pass it into whatever owns the pipeline. Callers must obtain queues
/// through [`get_or_create`](Self::get_or_create) — constructing instances
/// directly would break the one-queue-per-key guarantee that makes per-key
/// serialization hold.
///
/// Queues live until [`release`](Self::release); releasing drops the
/// registry's reference while outstanding handles keep draining.
pub struct JobRegistry<T> {
    queues: Mutex<HashMap<String, Arc<JobQueue<T>>>>,
}

impl<T: Clone + Send + 'static> JobRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queues: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the queue registered under `key`, creating it on first access.
    pub fn get_or_create(&self, key: &str) -> Arc<JobQueue<T>> {
        let mut queues = self.queues.lock();
        match queues.get(key) {
            Some(queue) => Arc::clone(queue),
            None => {
                let queue = JobQueue::new();
                queues.insert(key.to_string(), Arc::clone(&queue));
                tracing::debug!(key, "job queue created");
                queue
            }
        }
    }

    /// Drops the registry's reference to the queue under `key`.
    ///
    /// Returns the released queue, if one existed; a later
    /// [`get_or_create`](Self::get_or_create) starts fresh.
    pub fn release(&self, key: &str) -> Option<Arc<JobQueue<T>>> {
        let released = self.queues.lock().remove(key);
        if released.is_some() {
            tracing::debug!(key, "job queue released");
        }
        released
    }

    /// `true` if a queue is currently registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.queues.lock().contains_key(key)
    }

    /// Number of registered queues.
    pub fn len(&self) -> usize {
        self.queues.lock().len()
    }

    /// `true` when no queue is registered.
    pub fn is_empty(&self) -> bool {
        self.queues.lock().is_empty()
    }
}
