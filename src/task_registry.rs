//! Fire-and-forget task tracking.
//!
//! Every dispatched operation runs on its own tokio task and is registered in
//! a concurrent pending set until its completion callback has run. `drain`
//! waits for the set to empty, which is what lets the client guarantee that
//! metrics and shadow calls started during `deliver` finish before shutdown
//! returns.
//!
//! A task that is dropped before it finishes (its runtime shut down) still
//! reports through its callback, as [`TaskOutcome::Cancelled`].
//!
//! There is no bound on the number of pending operations and no backpressure.

use dashmap::DashMap;
use futures_util::FutureExt;
use once_cell::sync::OnceCell;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// How a dispatched operation ended.
#[derive(Debug)]
pub enum TaskOutcome<T> {
    /// The operation ran to completion with this output.
    Completed(T),
    /// The operation panicked.
    Panicked(String),
    /// The task was dropped before the operation finished.
    Cancelled,
}

/// Runs the completion callback exactly once: with the real outcome, or with
/// `Cancelled` if the task is dropped first.
struct Completion<T, C>
where
    C: FnOnce(TaskOutcome<T>),
{
    on_complete: Option<C>,
    _outcome: PhantomData<fn(TaskOutcome<T>)>,
}

impl<T, C> Completion<T, C>
where
    C: FnOnce(TaskOutcome<T>),
{
    fn new(on_complete: C) -> Self {
        Self {
            on_complete: Some(on_complete),
            _outcome: PhantomData,
        }
    }

    fn complete(mut self, outcome: TaskOutcome<T>) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(outcome);
        }
    }
}

impl<T, C> Drop for Completion<T, C>
where
    C: FnOnce(TaskOutcome<T>),
{
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(TaskOutcome::Cancelled);
        }
    }
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    pending: Arc<DashMap<u64, JoinHandle<()>>>,
    next_id: AtomicU64,
    /// Runtime the tasks were spawned on, set by the first dispatch.
    runtime: OnceCell<Handle>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `operation` without waiting for it, then calls `on_complete`
    /// with its outcome. Must be called from within a tokio runtime.
    pub fn dispatch<F, T, C>(&self, operation: F, on_complete: C)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(TaskOutcome<T>) + Send + 'static,
    {
        let runtime = self.runtime.get_or_init(Handle::current);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        // The task must not deregister itself before it has been registered.
        let (registered_tx, registered_rx) = oneshot::channel::<()>();
        // Created outside the task so an unpolled task still reports.
        let completion = Completion::new(on_complete);

        let handle = runtime.spawn(async move {
            let outcome = match AssertUnwindSafe(operation).catch_unwind().await {
                Ok(output) => TaskOutcome::Completed(output),
                Err(panic) => TaskOutcome::Panicked(panic_message(panic.as_ref())),
            };
            completion.complete(outcome);

            let _ = registered_rx.await;
            pending.remove(&id);
        });

        self.pending.insert(id, handle);
        let _ = registered_tx.send(());
    }

    /// Number of operations whose completion callback has not finished yet.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Waits until every registered operation has completed.
    ///
    /// Operations dispatched while draining are waited for as well, but
    /// callers should stop dispatching before they drain.
    pub async fn drain(&self) {
        loop {
            let ids: Vec<u64> = self.pending.iter().map(|entry| *entry.key()).collect();
            if ids.is_empty() {
                return;
            }

            for id in ids {
                if let Some((_, handle)) = self.pending.remove(&id) {
                    // Panics are already reported through the callback.
                    let _ = handle.await;
                }
            }
        }
    }

    /// Drains from synchronous code, blocking the current thread.
    ///
    /// Only possible when the tasks run on a multi-thread runtime: a
    /// current-thread runtime cannot make progress while its only thread is
    /// blocked. Returns `false` without waiting in that case.
    pub fn drain_blocking(&self) -> bool {
        match Handle::try_current() {
            Ok(handle) => {
                if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
                    return false;
                }
                tokio::task::block_in_place(|| handle.block_on(self.drain()));
                true
            }
            Err(_) => match self.runtime.get() {
                Some(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                    handle.block_on(self.drain());
                    true
                }
                _ => false,
            },
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
