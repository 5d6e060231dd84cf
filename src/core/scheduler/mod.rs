//! Polling scheduler
//!
//! Turns a blocking sensor read into a one-shot or repeating background
//! task with cooperative cancellation and a cleanup hook that runs exactly
//! once per launched task.
//!
//! ## Design Principles
//!
//! - **One lifecycle per task**: waiting, cancellation checks, callbacks and
//!   cleanup of a task run as a single async task, so they are serialized
//! - **Blocking work off the runtime**: actions run on a bounded blocking
//!   pool (`max_workers` threads)
//! - **No external owner**: a launched task retires itself and reports its
//!   [`TaskSummary`] over a completion channel
//!
//! ## Usage
//!
//! ```
//! use raspi_sensors::core::scheduler::{Scheduler, SchedulerConfig};
//! use std::sync::mpsc;
//! use std::time::Duration;
//!
//! let scheduler = Scheduler::new(&SchedulerConfig::default()).unwrap();
//! let (tx, rx) = mpsc::channel();
//!
//! let task = scheduler
//!     .task(2u32, |n: &mut u32| *n * 21, move |_, answer| tx.send(answer).unwrap())
//!     .launch();
//!
//! assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
//! assert!(task.wait().is_some());
//! ```

mod poller;
mod task;

pub use poller::Poller;
pub use raspi_sensors_core::scheduler::TaskStats;
pub use task::{ScheduledTask, TaskBuilder, TaskSummary};

use crate::devices::traits::{Outcome, Sensor};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::{Builder, Handle, Runtime};

/// Name given to runtime threads
const THREAD_NAME: &str = "sensor-worker";

/// Runtime sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Threads driving task lifecycles and callbacks
    pub worker_threads: usize,

    /// Upper bound on concurrently running actions
    pub max_workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            max_workers: 8,
        }
    }
}

/// Scheduler construction errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler configuration: {0}")]
    Config(&'static str),

    #[error("failed to start the scheduler runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Owns the runtime that scheduled tasks run on
///
/// Dropping the scheduler shuts the runtime down in the background; every
/// task still pending is retired and its cleanup runs. Neither dropping nor
/// [`shutdown`](Self::shutdown) may happen inside an async context.
pub struct Scheduler {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl Scheduler {
    /// Start the runtime
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Config`] when either thread count is zero,
    /// and [`SchedulerError::Runtime`] when the OS refuses the threads.
    pub fn new(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        if config.worker_threads == 0 {
            return Err(SchedulerError::Config("worker_threads must be at least 1"));
        }
        if config.max_workers == 0 {
            return Err(SchedulerError::Config("max_workers must be at least 1"));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.max_workers)
            .thread_name(THREAD_NAME)
            .enable_time()
            .build()?;
        crate::log_info!(
            "scheduler started: {} workers, up to {} concurrent actions",
            config.worker_threads,
            config.max_workers
        );

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    /// Describe a task: `action` produces a result from `producer` off the
    /// calling thread, `callback` consumes it
    pub fn task<P, R, A, C>(&self, producer: P, action: A, callback: C) -> TaskBuilder<P, R, A, C>
    where
        P: Send + 'static,
        R: Send + 'static,
        A: FnMut(&mut P) -> R + Send + 'static,
        C: FnMut(&mut P, R) + Send + 'static,
    {
        TaskBuilder::new(self.handle.clone(), producer, action, callback)
    }

    /// Fetch once from `sensor` in the background
    pub fn fetch<S, F>(&self, sensor: S, callback: F) -> ScheduledTask
    where
        S: Sensor + 'static,
        F: FnMut(&mut S, Outcome) + Send + 'static,
    {
        self.task(sensor, |s: &mut S| s.fetch_or_error(), callback)
            .launch()
    }

    /// Fetch from `sensor` every `period` until cancelled
    pub fn fetch_interval<S, F>(&self, sensor: S, period: Duration, callback: F) -> ScheduledTask
    where
        S: Sensor + 'static,
        F: FnMut(&mut S, Outcome) + Send + 'static,
    {
        self.task(sensor, |s: &mut S| s.fetch_or_error(), callback)
            .period(period)
            .repeat(true)
            .launch()
    }

    /// Stop the runtime, waiting up to `timeout` for running actions
    pub fn shutdown(mut self, timeout: Duration) {
        if let Some(runtime) = self.runtime.take() {
            crate::log_info!("scheduler shutting down");
            runtime.shutdown_timeout(timeout);
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::pir::Pir;
    use crate::devices::traits::{MeasurementKind, Value};
    use crate::platform::mock::MockGpio;
    use crate::platform::Level;
    use std::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_zero_threads_rejected() {
        let config = SchedulerConfig {
            worker_threads: 0,
            ..Default::default()
        };
        assert!(matches!(
            Scheduler::new(&config),
            Err(SchedulerError::Config(_))
        ));

        let config = SchedulerConfig {
            max_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            Scheduler::new(&config),
            Err(SchedulerError::Config(_))
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let config: SchedulerConfig = toml::from_str("max_workers = 3").unwrap();

        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.max_workers, 3);
    }

    #[test]
    fn test_fetch_delivers_outcome() {
        let scheduler = Scheduler::new(&SchedulerConfig::default()).unwrap();
        let gpio = MockGpio::new();
        gpio.set_input_level(17, Level::High);
        let (tx, rx) = mpsc::channel();

        let task = scheduler.fetch(Pir::new("door", 17, gpio), move |pir, outcome| {
            tx.send((pir.name().to_string(), outcome)).unwrap();
        });

        let (name, outcome) = rx.recv_timeout(TIMEOUT).unwrap();
        assert_eq!(name, "door");
        let results = outcome.into_result().unwrap();
        assert_eq!(results[0].kind(), MeasurementKind::Detection);
        assert_eq!(results[0].value(), Value::Integer(1));
        assert!(task.wait_timeout(TIMEOUT).is_some());
    }

    #[test]
    fn test_fetch_interval_repeats_until_cancelled() {
        let scheduler = Scheduler::new(&SchedulerConfig::default()).unwrap();
        let gpio = MockGpio::new();
        let (tx, rx) = mpsc::channel();

        let task = scheduler.fetch_interval(
            Pir::new("door", 17, gpio),
            Duration::from_millis(5),
            move |_, outcome| {
                let _ = tx.send(outcome.has_results());
            },
        );

        for _ in 0..3 {
            assert!(rx.recv_timeout(TIMEOUT).unwrap());
        }
        task.cancel();
        let summary = task.wait_timeout(TIMEOUT).unwrap();
        assert!(summary.cancelled);
        assert!(summary.stats.delivered >= 3);
    }
}
