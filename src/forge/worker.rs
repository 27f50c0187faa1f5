use std::fmt;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use super::error::Error;

/// Kind of work handed to the pool, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
    Compile,
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskClass::Compile => "compile",
        })
    }
}

/// Bounded pool of background threads for CPU-bound work.
///
/// Owns a dedicated multi-threaded tokio runtime whose blocking pool is capped
/// at the configured number of workers. Dropping the pool does not wait for
/// running tasks.
pub struct WorkerPool {
    runtime: Option<Runtime>,
    handle: Handle,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, Error> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("rforge-worker")
            .build()
            .map_err(Error::WorkerPool)?;
        let handle = runtime.handle().clone();
        Ok(Self {
            runtime: Some(runtime),
            handle,
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn spawn_blocking<F, R>(&self, class: TaskClass, task: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        tracing::trace!(worker_class = %class, "worker.spawn_blocking");
        self.handle.spawn_blocking(task)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_tasks_off_the_calling_thread() {
        let pool = WorkerPool::new(1).unwrap();
        let caller = std::thread::current().id();

        let (tx, rx) = std::sync::mpsc::channel();
        pool.spawn_blocking(TaskClass::Compile, move || {
            tx.send(std::thread::current().id()).unwrap();
        });

        assert_ne!(rx.recv().unwrap(), caller);
    }

    #[test]
    fn zero_workers_is_raised_to_one() {
        assert_eq!(WorkerPool::new(0).unwrap().workers(), 1);
    }
}
