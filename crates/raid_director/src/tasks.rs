//! Cancellable timers backing the per-map schedules.
//!
//! Every scheduled callback is owned by a [`TaskHandle`]. Dropping or
//! cancelling the handle aborts the underlying task, so tearing down a map
//! session is a matter of dropping its handles.
//!
//! Scheduling needs a tokio runtime on the calling thread. Without one the
//! spawn functions return [`DirectorError::TaskError`] instead of panicking.

use crate::error::{DirectorError, DirectorResult};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// Owner of one scheduled task.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the task. Safe to call on a task that already finished.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            trace!("Cancelling task {}", self.name);
        }
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The runtime of the calling thread.
fn runtime_for(name: &str) -> DirectorResult<Handle> {
    Handle::try_current()
        .map_err(|e| DirectorError::TaskError(format!("cannot schedule `{name}` outside a tokio runtime: {e}")))
}

/// Runs `task` once after `delay`.
///
/// # Errors
///
/// [`DirectorError::TaskError`] when called outside a tokio runtime.
pub fn spawn_delayed<F, Fut>(name: impl Into<String>, delay: Duration, task: F) -> DirectorResult<TaskHandle>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let name = name.into();
    let runtime = runtime_for(&name)?;
    let handle = runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        task().await;
    });
    Ok(TaskHandle { name, handle })
}

/// Runs `task` every `period`, first after one full period has elapsed.
///
/// A zero period is bumped to one millisecond.
///
/// # Errors
///
/// [`DirectorError::TaskError`] when called outside a tokio runtime.
pub fn spawn_periodic<F, Fut>(name: impl Into<String>, period: Duration, mut task: F) -> DirectorResult<TaskHandle>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let name = name.into();
    let runtime = runtime_for(&name)?;
    let period = period.max(Duration::from_millis(1));
    let handle = runtime.spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            task().await;
        }
    });
    Ok(TaskHandle { name, handle })
}
