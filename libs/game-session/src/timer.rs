//! Cancellable timers owned by a session.
//!
//! Every timer callback holds only a `Weak` to its session. Once the session
//! is dropped the callback never runs; once it is closed the callback runs
//! into the closed-state guard and does nothing.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// A spawned task that is aborted when the guard is dropped.
#[derive(Debug)]
pub(crate) struct TaskGuard {
    handle: JoinHandle<()>,
}

impl TaskGuard {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a repeating tick. The first tick fires one `period` from now.
///
/// Stops when `on_tick` breaks, when the target is gone, or when the
/// returned guard is dropped.
pub(crate) fn countdown<T, F>(target: Weak<T>, period: Duration, on_tick: F) -> TaskGuard
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> ControlFlow<()> + Send + 'static,
{
    TaskGuard::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            let Some(target) = target.upgrade() else {
                break;
            };
            if on_tick(&target).is_break() {
                break;
            }
        }
    })
}

/// Delayed one-shot callbacks of a session, cancelled together on close.
#[derive(Debug, Default)]
pub(crate) struct Scheduled {
    tasks: Vec<TaskGuard>,
}

impl Scheduled {
    pub fn after<T, F>(&mut self, delay: Duration, target: Weak<T>, callback: F)
    where
        T: Send + Sync + 'static,
        F: FnOnce(&T) + Send + 'static,
    {
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(TaskGuard::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(target) = target.upgrade() {
                callback(&target);
            }
        }));
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }
}
