//! Group of tasks cancelled together

use super::task::{ScheduledTask, TaskSummary};
use std::time::{Duration, Instant};

/// Keeps the handles of running tasks
///
/// Retired tasks are pruned whenever a new one is added.
#[derive(Debug, Default)]
pub struct Poller {
    tasks: Vec<ScheduledTask>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: ScheduledTask) {
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every task still held
    pub fn cancel_all(&self) {
        for task in &self.tasks {
            task.cancel();
        }
    }

    /// Cancel every task and let go of the handles
    ///
    /// Returns the number of tasks that had not retired yet.
    pub fn clear(&mut self) -> usize {
        self.cancel_all();
        let pending = self.tasks.iter().filter(|t| !t.is_finished()).count();
        self.tasks.clear();
        crate::log_debug!("cleared {} pending tasks", pending);
        pending
    }

    /// Block until every task retired
    pub fn join(self) -> Vec<Option<TaskSummary>> {
        self.tasks.into_iter().map(ScheduledTask::wait).collect()
    }

    /// Wait for every task to retire, sharing one `timeout`
    ///
    /// A task that did not retire in time, or was never launched, yields
    /// `None`.
    pub fn wait_all(self, timeout: Duration) -> Vec<Option<TaskSummary>> {
        let deadline = Instant::now() + timeout;
        self.tasks
            .iter()
            .map(|t| t.wait_timeout(deadline.saturating_duration_since(Instant::now())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::{Scheduler, SchedulerConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_clear_cancels_everything() {
        let scheduler = Scheduler::new(&SchedulerConfig::default()).unwrap();
        let cleanups = Arc::new(AtomicUsize::new(0));
        let mut poller = Poller::new();

        for _ in 0..3 {
            let c = cleanups.clone();
            let task = scheduler
                .task((), |_| (), |_, _| {})
                .period(Duration::from_secs(30))
                .repeat(true)
                .on_cleanup(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .launch();
            poller.push(task);
        }
        assert_eq!(poller.len(), 3);

        poller.cancel_all();
        let summaries = poller.wait_all(Duration::from_secs(5));

        assert_eq!(summaries.len(), 3);
        assert!(summaries.iter().all(|s| s.is_some_and(|s| s.cancelled)));
        assert_eq!(cleanups.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_push_prunes_retired_tasks() {
        let scheduler = Scheduler::new(&SchedulerConfig::default()).unwrap();
        let mut poller = Poller::new();

        let done = scheduler.task((), |_| (), |_, _| {}).launch();
        done.wait_timeout(Duration::from_secs(5)).unwrap();
        poller.push(done);

        let waiting = scheduler
            .task((), |_| (), |_, _| {})
            .period(Duration::from_secs(30))
            .launch();
        poller.push(waiting);

        assert_eq!(poller.len(), 1);
        assert_eq!(poller.clear(), 1);
        assert!(poller.is_empty());
    }
}
