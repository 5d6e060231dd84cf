//! Scheduler lifecycle tests driving real sensor drivers

#![cfg(feature = "mock")]

use raspi_sensors::core::scheduler::{Poller, Scheduler, SchedulerConfig};
use raspi_sensors::devices::factory::MockBus;
use raspi_sensors::devices::traits::{MeasurementKind, Outcome, Value};
use raspi_sensors::devices::{Sensor, SensorConfig, SensorType};
use raspi_sensors::platform::Level;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);
const PIR_PIN: u8 = 23;

fn scheduler() -> Scheduler {
    Scheduler::new(&SchedulerConfig::default()).unwrap()
}

fn pir(buses: &MockBus) -> impl Sensor + 'static {
    SensorConfig::gpio("hall", SensorType::Pir, PIR_PIN)
        .build(buses)
        .unwrap()
}

#[test]
fn test_cancel_before_launch_is_ignored() {
    let scheduler = scheduler();
    let buses = MockBus::default();
    let (tx, rx) = mpsc::channel();
    let task = scheduler
        .task(
            pir(&buses),
            |s| s.fetch_or_error(),
            move |_, outcome: Outcome| tx.send(outcome).unwrap(),
        )
        .build();

    task.cancel();
    assert!(!task.is_cancelled());
    assert!(task.launch());

    let outcome = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(outcome.has_results());
    let summary = task.wait().unwrap();
    assert!(!summary.cancelled);
    assert_eq!(summary.stats.delivered, 1);
}

#[test]
fn test_second_launch_has_no_effect() {
    let scheduler = scheduler();
    let buses = MockBus::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let task = scheduler
        .task(
            pir(&buses),
            |s| s.fetch_or_error(),
            move |_, _: Outcome| {
                seen.fetch_add(1, Ordering::SeqCst);
            },
        )
        .build();

    assert!(task.launch());
    assert!(!task.launch());

    let summary = task.wait().unwrap();
    assert_eq!(summary.stats.cycles, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_interval_fetch_until_cancelled() {
    let scheduler = scheduler();
    let buses = MockBus::default();
    buses.gpio.set_input_level(PIR_PIN, Level::High);
    let (tx, rx) = mpsc::channel();
    let cleanups = Arc::new(AtomicUsize::new(0));
    let cleaned = Arc::clone(&cleanups);

    let task = scheduler
        .task(
            pir(&buses),
            |s| s.fetch_or_error(),
            move |_, outcome: Outcome| {
                let _ = tx.send(outcome);
            },
        )
        .period(Duration::from_millis(10))
        .repeat(true)
        .on_cleanup(move || {
            cleaned.fetch_add(1, Ordering::SeqCst);
        })
        .launch();

    for _ in 0..3 {
        let outcome = rx.recv_timeout(TIMEOUT).unwrap();
        let results = outcome.results();
        assert_eq!(results[0].kind(), MeasurementKind::Detection);
        assert_eq!(results[0].value(), Value::Integer(1));
    }
    task.cancel();
    task.cancel();

    let summary = task.wait_timeout(TIMEOUT).unwrap();
    assert!(summary.cancelled);
    assert!(summary.stats.delivered >= 3);
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_during_wait_skips_action() {
    let scheduler = scheduler();
    let buses = MockBus::default();
    let (tx, rx) = mpsc::channel::<Outcome>();

    let task = scheduler.fetch_interval(pir(&buses), Duration::from_secs(30), move |_, o| {
        let _ = tx.send(o);
    });
    task.cancel();

    let summary = task.wait_timeout(TIMEOUT).unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.stats.cycles, 0);
    assert!(rx.try_recv().is_err());
    assert!(!buses.gpio.is_initialized());
}

#[test]
fn test_one_shot_error_outcome_delivered() {
    let scheduler = scheduler();
    let buses = MockBus::default();
    buses.i2c.fail_open("Permission denied");
    let sensor = SensorConfig::i2c("baro", SensorType::Bmp180, 0x77)
        .build(&buses)
        .unwrap();
    let (tx, rx) = mpsc::channel();

    let task = scheduler.fetch(sensor, move |s, outcome| {
        tx.send((s.name().to_string(), outcome)).unwrap();
    });

    let (name, outcome) = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(name, "baro");
    assert!(outcome.has_error());
    assert!(!outcome.has_results());
    assert!(task.wait_timeout(TIMEOUT).is_some());
}

#[test]
fn test_poller_cancels_every_task() {
    let scheduler = scheduler();
    let buses = MockBus::default();
    let mut poller = Poller::new();
    for _ in 0..4 {
        poller.push(scheduler.fetch_interval(
            pir(&buses),
            Duration::from_millis(5),
            |_, _| {},
        ));
    }
    assert_eq!(poller.len(), 4);

    poller.cancel_all();
    let summaries = poller.wait_all(TIMEOUT);

    assert_eq!(summaries.len(), 4);
    assert!(summaries.iter().all(|s| s.map_or(false, |s| s.cancelled)));
    scheduler.shutdown(TIMEOUT);
}
