//! Sequential job queue: ordered, non-overlapping execution per instance.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::JobError;

/// Work function invoked for each item.
type Worker<T> = Arc<dyn Fn(T) -> BoxFuture<'static, Result<(), JobError>> + Send + Sync>;

/// Lifecycle hook (start/finish).
type Hook = Arc<dyn Fn() + Send + Sync>;

/// Error handler; the returned flag decides whether draining continues.
type ErrorHandler<T> = Arc<dyn Fn(JobError, T) -> BoxFuture<'static, bool> + Send + Sync>;

/// Mutable queue state. The lock is only ever held for plain list/flag
/// manipulation, never across an await point.
struct Inner<T> {
    pending: VecDeque<T>,
    worker: Option<Worker<T>>,
    on_start: Option<Hook>,
    on_finish: Option<Hook>,
    on_error: Option<ErrorHandler<T>>,
    /// A drain loop is active.
    running: bool,
    /// An item is currently being processed by the worker.
    in_flight: bool,
    /// An unhandled worker failure shut this queue down for good.
    defunct: bool,
}

/// Strictly sequential job queue.
///
/// Any number of callers may enqueue concurrently; items are executed one at
/// a time, in enqueue order, by a single drain loop. Queues are always
/// handled as `Arc<JobQueue<T>>` (see [`JobQueue::new`]); the
/// [`JobRegistry`](crate::JobRegistry) hands out one instance per key.
///
/// ## Hooks
/// - `on_start` fires once per `create_job`/`create_jobs` call that finds a
///   registered worker, and once when a worker is first registered on a
///   non-empty queue.
/// - `on_finish` fires exactly once per drain-to-empty.
/// - `on_error` holds **at most one** handler; registering again replaces
///   the previous one. The handler's returned flag decides whether the rest
///   of the pending list still runs.
///
/// ## Failure policy
/// A worker failure with no handler registered is fatal for the instance:
/// remaining items are dropped, the queue is marked defunct, and `on_finish`
/// never fires for that drain. Callers should release defunct queues from
/// the registry.
pub struct JobQueue<T> {
    me: Weak<JobQueue<T>>,
    inner: Mutex<Inner<T>>,
}

impl<T: Clone + Send + 'static> JobQueue<T> {
    /// Creates a new queue with no worker and empty pending list.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                worker: None,
                on_start: None,
                on_finish: None,
                on_error: None,
                running: false,
                in_flight: false,
                defunct: false,
            }),
        })
    }

    /// Appends one item and starts draining if a worker is registered.
    ///
    /// Items enqueued on a defunct queue are dropped with a warning.
    pub fn create_job(&self, item: T) {
        let start = {
            let mut g = self.inner.lock();
            if g.defunct {
                drop(g);
                tracing::warn!("job dropped: queue is defunct");
                return;
            }
            g.pending.push_back(item);
            g.worker.is_some().then(|| g.on_start.clone()).flatten()
        };
        if let Some(hook) = start {
            hook();
        }
        self.try_spawn_drain();
    }

    /// Appends a batch, preserving the relative order of `items`.
    ///
    /// Fires the start hook once for the whole batch.
    pub fn create_jobs(&self, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        let start = {
            let mut g = self.inner.lock();
            if g.defunct {
                drop(g);
                tracing::warn!(count = items.len(), "jobs dropped: queue is defunct");
                return;
            }
            g.pending.extend(items);
            g.worker.is_some().then(|| g.on_start.clone()).flatten()
        };
        if let Some(hook) = start {
            hook();
        }
        self.try_spawn_drain();
    }

    /// Registers (or replaces) the worker and starts draining if items are
    /// already pending.
    ///
    /// Replacing applies to items that have not started yet; an in-flight
    /// item finishes with the worker it started with.
    pub fn process<F, Fut>(&self, worker: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        let worker: Worker<T> =
            Arc::new(move |item| -> BoxFuture<'static, Result<(), JobError>> {
                Box::pin(worker(item))
            });
        let start = {
            let mut g = self.inner.lock();
            let first_registration = g.worker.is_none();
            g.worker = Some(worker);
            (first_registration && !g.pending.is_empty())
                .then(|| g.on_start.clone())
                .flatten()
        };
        if let Some(hook) = start {
            hook();
        }
        self.try_spawn_drain();
    }

    /// Sets the hook fired when work begins or the pending list grows.
    pub fn on_start<F: Fn() + Send + Sync + 'static>(&self, hook: F) {
        self.inner.lock().on_start = Some(Arc::new(hook));
    }

    /// Sets the hook fired once per drain-to-empty.
    pub fn on_finish<F: Fn() + Send + Sync + 'static>(&self, hook: F) {
        self.inner.lock().on_finish = Some(Arc::new(hook));
    }

    /// Registers the error handler, replacing any previous one.
    ///
    /// The handler receives the failure and the item that failed. Returning
    /// `true` resumes draining with the next item; `false` discards every
    /// item that has not started yet.
    pub fn on_error<F, Fut>(&self, handler: F)
    where
        F: Fn(JobError, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handler: ErrorHandler<T> =
            Arc::new(move |err, item| -> BoxFuture<'static, bool> { Box::pin(handler(err, item)) });
        self.inner.lock().on_error = Some(handler);
    }

    /// Number of items not yet started.
    pub fn waiting(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Number of items not yet finished: waiting plus the in-flight item.
    pub fn len(&self) -> usize {
        let g = self.inner.lock();
        g.pending.len() + usize::from(g.in_flight)
    }

    /// `true` when nothing is waiting or in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` once a worker has been registered.
    pub fn has_worker(&self) -> bool {
        self.inner.lock().worker.is_some()
    }

    /// `true` after an unhandled worker failure shut the queue down.
    pub fn is_defunct(&self) -> bool {
        self.inner.lock().defunct
    }

    /// Spawns the drain loop unless one is already active (or the queue has
    /// no worker, nothing pending, or is defunct). Concurrent triggers race
    /// on the `running` flag under the lock, so at most one loop wins.
    fn try_spawn_drain(&self) {
        {
            let mut g = self.inner.lock();
            if g.running || g.defunct || g.worker.is_none() || g.pending.is_empty() {
                return;
            }
            g.running = true;
        }
        // Upgrade fails only while the last strong handle is being dropped.
        let Some(queue) = self.me.upgrade() else {
            self.inner.lock().running = false;
            return;
        };
        tokio::spawn(async move { queue.drain().await });
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let (item, worker) = {
                let mut g = self.inner.lock();
                let Some(item) = g.pending.pop_front() else {
                    g.running = false;
                    let finish = g.on_finish.clone();
                    drop(g);
                    if let Some(hook) = finish {
                        hook();
                    }
                    return;
                };
                // The loop only starts with a worker present and replacement
                // always swaps in a new one, so this cannot be None.
                let Some(worker) = g.worker.clone() else {
                    g.pending.push_front(item);
                    g.running = false;
                    return;
                };
                g.in_flight = true;
                (item, worker)
            };

            match worker(item.clone()).await {
                Ok(()) => {
                    self.inner.lock().in_flight = false;
                }
                Err(err) => {
                    let handler = self.inner.lock().on_error.clone();
                    match handler {
                        Some(handler) => {
                            let resume = handler(err, item).await;
                            let mut g = self.inner.lock();
                            g.in_flight = false;
                            if !resume {
                                let dropped = g.pending.len();
                                g.pending.clear();
                                drop(g);
                                if dropped > 0 {
                                    tracing::debug!(dropped, "error handler cancelled remaining jobs");
                                }
                            }
                        }
                        None => {
                            let mut g = self.inner.lock();
                            g.in_flight = false;
                            g.running = false;
                            g.defunct = true;
                            let dropped = g.pending.len();
                            g.pending.clear();
                            drop(g);
                            tracing::error!(error = %err, dropped, "unhandled worker failure; queue is defunct");
                            return;
                        }
                    }
                }
            }
        }
    }
}
