//! Task-execution policies.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{DomainError, Result};

/// A unit of work handed to an [`Executor`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs submitted tasks.
///
/// Executors are for extension work; archive mutation never goes through
/// them.
pub trait Executor: Send + Sync {
    fn submit(&self, task: Task) -> Result<()>;
}

/// Runs every task on the submitting thread before `submit` returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn submit(&self, task: Task) -> Result<()> {
        task();
        Ok(())
    }
}

/// Runs tasks in submission order on one dedicated, named worker thread.
///
/// A panicking task is logged and does not stop the worker. Dropping the
/// executor (or calling [`shutdown`](Self::shutdown)) lets queued tasks
/// finish, then joins the worker.
pub struct SingleThreadExecutor {
    name: String,
    sender: Mutex<Option<Sender<Task>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SingleThreadExecutor {
    /// Start the worker thread, named `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel::<Task>();

        let thread_name = name.clone();
        let worker = thread::Builder::new().name(name.clone()).spawn(move || {
            for task in receiver {
                if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                    log::warn!("Task panicked on executor thread {}", thread_name);
                }
            }
            log::debug!("Executor thread {} finished", thread_name);
        })?;

        log::debug!("Started executor thread {}", name);
        Ok(Self {
            name,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Name of the worker thread.
    pub fn thread_name(&self) -> &str {
        &self.name
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stop accepting tasks, drain the queue and join the worker.
    ///
    /// Idempotent. When called from the worker itself the join is skipped.
    pub fn shutdown(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                log::warn!("Executor thread {} panicked", self.name);
            }
        }
    }
}

impl Executor for SingleThreadExecutor {
    fn submit(&self, task: Task) -> Result<()> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender
                .send(task)
                .map_err(|_| DomainError::ExecutorShutdown(self.name.clone())),
            None => Err(DomainError::ExecutorShutdown(self.name.clone())),
        }
    }
}

impl Drop for SingleThreadExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for SingleThreadExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleThreadExecutor")
            .field("name", &self.name)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn inline_runs_on_caller_thread() {
        let caller = thread::current().id();
        let (tx, rx) = mpsc::channel();
        InlineExecutor
            .submit(Box::new(move || tx.send(thread::current().id()).unwrap()))
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), caller);
    }

    #[test]
    fn single_thread_uses_named_worker() {
        let executor = SingleThreadExecutor::new("shrinkfs-test-worker").unwrap();
        let (tx, rx) = mpsc::channel();
        for _ in 0..3 {
            let tx = tx.clone();
            executor
                .submit(Box::new(move || {
                    let current = thread::current();
                    tx.send((current.id(), current.name().map(str::to_string)))
                        .unwrap();
                }))
                .unwrap();
        }

        let seen: Vec<_> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert!(seen.iter().all(|(id, _)| *id == seen[0].0));
        assert_ne!(seen[0].0, thread::current().id());
        assert_eq!(seen[0].1.as_deref(), Some("shrinkfs-test-worker"));
    }

    #[test]
    fn shutdown_drains_queue_then_rejects() {
        let executor = SingleThreadExecutor::new("drain").unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let done = Arc::clone(&done);
            executor
                .submit(Box::new(move || {
                    done.fetch_add(1, Ordering::SeqCst);
                }))
                .unwrap();
        }

        executor.shutdown();
        executor.shutdown();
        assert_eq!(done.load(Ordering::SeqCst), 10);
        assert!(executor.is_shut_down());
        assert!(matches!(
            executor.submit(Box::new(|| {})),
            Err(DomainError::ExecutorShutdown(name)) if name == "drain"
        ));
    }

    #[test]
    fn panicking_task_keeps_worker_alive() {
        let executor = SingleThreadExecutor::new("panics").unwrap();
        executor.submit(Box::new(|| panic!("boom"))).unwrap();

        let (tx, rx) = mpsc::channel();
        executor
            .submit(Box::new(move || tx.send(()).unwrap()))
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
