//! Scheduled task lifecycle
//!
//! A [`ScheduledTask`] moves Idle → Launched → (wait → action → callback)*
//! → retired. The whole lifecycle runs as one async task on the scheduler
//! runtime, so the callbacks of a task never overlap and action N+1 never
//! starts before callback N returned. The action itself runs on the
//! blocking pool, which keeps a slow bus transaction off the runtime
//! workers.
//!
//! Cancellation is cooperative. It interrupts the pre-action wait but never
//! an action already running; the result of such an action is dropped and
//! its callback skipped.

use raspi_sensors_core::scheduler::TaskStats;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Notify;

type Cleanup = Box<dyn FnOnce() + Send + 'static>;
type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Flags shared between a task handle and its running lifecycle
#[derive(Debug, Default)]
struct Control {
    launched: AtomicBool,
    cancelled: AtomicBool,
    finished: AtomicBool,
    wake: Notify,
}

impl Control {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Final state of a retired task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    pub stats: TaskStats,

    /// The task was cancelled before it retired on its own
    pub cancelled: bool,
}

/// Retires a launched task when dropped
///
/// Owned by the lifecycle future, so it runs whether the lifecycle ends
/// normally, unwinds, or is dropped by a runtime shutdown.
struct Retirement {
    control: Arc<Control>,
    cleanup: Option<Cleanup>,
    stats: TaskStats,
    done: SyncSender<TaskSummary>,
}

impl Drop for Retirement {
    fn drop(&mut self) {
        if !self.control.launched.load(Ordering::Acquire) {
            return;
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        self.control.finished.store(true, Ordering::Release);

        let summary = TaskSummary {
            stats: self.stats,
            cancelled: self.control.is_cancelled(),
        };
        crate::log_debug!(
            "task retired after {} cycles ({} delivered, {} suppressed)",
            summary.stats.cycles,
            summary.stats.delivered,
            summary.stats.suppressed
        );
        // Nobody waiting is fine
        let _ = self.done.try_send(summary);
    }
}

async fn run_cycles<P, R, A, C>(
    mut producer: P,
    mut action: A,
    mut callback: C,
    period: Duration,
    repeat: bool,
    control: Arc<Control>,
    mut retirement: Retirement,
) where
    P: Send + 'static,
    R: Send + 'static,
    A: FnMut(&mut P) -> R + Send + 'static,
    C: FnMut(&mut P, R) + Send + 'static,
{
    loop {
        if !period.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(period) => {}
                _ = control.wake.notified() => {}
            }
        }
        if control.is_cancelled() {
            crate::log_debug!("task cancelled before its action ran");
            break;
        }

        let started = Instant::now();
        let joined = tokio::task::spawn_blocking(move || {
            let result = action(&mut producer);
            (producer, action, result)
        })
        .await;
        let result = match joined {
            Ok((p, a, result)) => {
                producer = p;
                action = a;
                result
            }
            Err(e) => {
                crate::log_error!("scheduled action did not complete: {}", e);
                break;
            }
        };
        let elapsed_us = u32::try_from(started.elapsed().as_micros()).unwrap_or(u32::MAX);
        retirement.stats.record_action(elapsed_us);

        if control.is_cancelled() {
            retirement.stats.record_suppressed();
            break;
        }
        callback(&mut producer, result);
        retirement.stats.record_delivery();

        if !repeat || control.is_cancelled() {
            break;
        }
    }
}

/// Configures a task before it is built
///
/// Obtained from [`Scheduler::task`](super::Scheduler::task).
pub struct TaskBuilder<P, R, A, C> {
    handle: Handle,
    producer: P,
    action: A,
    callback: C,
    period: Duration,
    repeat: bool,
    cleanup: Option<Cleanup>,
    _result: PhantomData<fn() -> R>,
}

impl<P, R, A, C> TaskBuilder<P, R, A, C>
where
    P: Send + 'static,
    R: Send + 'static,
    A: FnMut(&mut P) -> R + Send + 'static,
    C: FnMut(&mut P, R) + Send + 'static,
{
    pub(super) fn new(handle: Handle, producer: P, action: A, callback: C) -> Self {
        Self {
            handle,
            producer,
            action,
            callback,
            period: Duration::ZERO,
            repeat: false,
            cleanup: None,
            _result: PhantomData,
        }
    }

    /// Wait this long before every action (zero: run immediately)
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run again after each delivered result until cancelled
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Run `cleanup` once when the launched task retires
    pub fn on_cleanup(mut self, cleanup: impl FnOnce() + Send + 'static) -> Self {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Build an idle task
    pub fn build(self) -> ScheduledTask {
        let control = Arc::new(Control::default());
        let (done, finished) = mpsc::sync_channel(1);
        let retirement = Retirement {
            control: control.clone(),
            cleanup: self.cleanup,
            stats: TaskStats::default(),
            done,
        };
        let lifecycle = run_cycles(
            self.producer,
            self.action,
            self.callback,
            self.period,
            self.repeat,
            control.clone(),
            retirement,
        );

        ScheduledTask {
            handle: self.handle,
            control,
            pending: Mutex::new(Some(Box::pin(lifecycle))),
            finished,
        }
    }

    /// Build the task and launch it
    pub fn launch(self) -> ScheduledTask {
        let task = self.build();
        task.launch();
        task
    }
}

/// Handle to one background task
///
/// Dropping the handle detaches a launched task; it keeps running and
/// retires on its own.
pub struct ScheduledTask {
    handle: Handle,
    control: Arc<Control>,
    pending: Mutex<Option<TaskFuture>>,
    finished: Receiver<TaskSummary>,
}

impl ScheduledTask {
    /// Start the task
    ///
    /// Only the first call has an effect; it returns `true`.
    pub fn launch(&self) -> bool {
        let lifecycle = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(lifecycle) = lifecycle else {
            return false;
        };
        self.control.launched.store(true, Ordering::Release);
        self.handle.spawn(lifecycle);
        true
    }

    /// Request cancellation
    ///
    /// Idempotent, and ignored for a task that was never launched. Wakes a
    /// pending wait; an action already running finishes, but its callback
    /// is skipped.
    pub fn cancel(&self) {
        if !self.control.launched.load(Ordering::Acquire) {
            return;
        }
        if !self.control.cancelled.swap(true, Ordering::AcqRel) {
            self.control.wake.notify_one();
        }
    }

    pub fn is_launched(&self) -> bool {
        self.control.launched.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }

    /// The task retired and its cleanup ran
    pub fn is_finished(&self) -> bool {
        self.control.finished.load(Ordering::Acquire)
    }

    /// Block until the task retires
    ///
    /// Returns `None` for a task that was never launched. Must not be
    /// called from inside the scheduler runtime.
    pub fn wait(self) -> Option<TaskSummary> {
        if !self.is_launched() {
            return None;
        }
        self.finished.recv().ok()
    }

    /// Block until the task retires or `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Option<TaskSummary> {
        if !self.is_launched() {
            return None;
        }
        self.finished.recv_timeout(timeout).ok()
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("launched", &self.is_launched())
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}
