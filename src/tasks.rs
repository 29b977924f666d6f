//! Cancellable background work: every timer the managers start goes through here
//! so that disposing a manager tears its timers down.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Handle to a spawned task. Dropping it aborts the task.
///
/// Timers need a Tokio runtime; outside one nothing is scheduled and a
/// warning is logged instead of panicking.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = match Handle::try_current() {
            Ok(rt) => Some(rt.spawn(fut)),
            Err(_) => {
                tracing::warn!("No Tokio runtime available, task not scheduled");
                None
            }
        };
        Self { handle }
    }

    /// Run `fut` once `delay` has elapsed.
    pub fn after<F>(delay: Duration, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        })
    }

    /// True once the task ran to completion, was aborted, or was never scheduled.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// A bag of tasks owned by one component.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: ScheduledTask) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }

    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.push(ScheduledTask::spawn(fut));
    }

    pub fn after<F>(&self, delay: Duration, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.push(ScheduledTask::after(delay, fut));
    }

    /// Tasks not yet finished.
    pub fn live(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.iter().filter(|t| !t.is_finished()).count()
    }

    pub fn cancel_all(&self) {
        let drained: Vec<_> = {
            let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.drain(..).collect()
        };
        // Dropping aborts.
        drop(drained);
    }
}
