//! Sensor polling daemon.
//!
//! Builds every sensor listed in the configuration file on the Linux GPIO
//! and I2C backends, schedules it, and prints one JSON line per result or
//! error record on stdout.
//!
//! Usage:
//!   sensord [OPTIONS]
//!
//! Options:
//!   -c, --config <PATH>    Configuration file (default: sensord.toml)
//!   -d, --duration <SECS>  Cancel repeating sensors after SECS seconds

use std::env;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use raspi_sensors::core::scheduler::{Poller, Scheduler};
use raspi_sensors::devices::factory::LinuxBus;
use raspi_sensors::devices::record::{ErrorRecord, Records};
use raspi_sensors::devices::traits::{Outcome, Sensor};
use raspi_sensors::parameters::AppConfig;
use raspi_sensors::{log_error, log_info, log_warn};
use serde::Serialize;

/// Time granted to in-flight actions once all tasks retired
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct Args {
    config: PathBuf,
    duration: Option<Duration>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: PathBuf::from("sensord.toml"),
        duration: None,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                args.config = PathBuf::from(required_value(&raw, i, "config"));
            }
            "-d" | "--duration" => {
                i += 1;
                let secs: u64 = required_value(&raw, i, "duration")
                    .parse()
                    .unwrap_or_else(|_| {
                        eprintln!("Error: invalid value for --duration");
                        process::exit(1);
                    });
                args.duration = Some(Duration::from_secs(secs));
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    args
}

fn required_value<'a>(raw: &'a [String], i: usize, name: &str) -> &'a str {
    raw.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: sensord [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -c, --config <PATH>    Configuration file (default: sensord.toml)\n\
         \x20 -d, --duration <SECS>  Cancel repeating sensors after SECS seconds\n\
         \x20 -h, --help             Show this help"
    );
}

fn emit<T: Serialize>(record: &T) {
    match serde_json::to_string(record) {
        Ok(line) => println!("{line}"),
        Err(e) => log_error!("failed to serialize record: {}", e),
    }
}

fn emit_records(records: &Records) {
    match records {
        Records::Results(results) => results.iter().for_each(emit),
        Records::Error(error) => emit(error),
    }
}

fn report<S: Sensor>(sensor: &mut S, outcome: Outcome) {
    emit_records(&Records::from_outcome(
        &outcome,
        sensor.name(),
        sensor.sensor_type(),
    ));
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();

    let config = AppConfig::load(&args.config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let scheduler = Scheduler::new(&config.scheduler).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let buses = LinuxBus {
        gpio_chip: config.gpio.chip.clone(),
        i2c_bus: config.i2c.bus.clone(),
        timing: config.gpio.timing.into(),
    };

    let mut poller = Poller::new();
    for entry in &config.sensors {
        let sensor = match entry.sensor.build(&buses) {
            Ok(sensor) => sensor,
            Err(e) => {
                log_warn!("skipping sensor '{}': {}", entry.sensor.name, e);
                emit(&ErrorRecord::from(&e));
                continue;
            }
        };
        log_info!(
            "scheduling {} '{}' ({})",
            sensor.sensor_type(),
            sensor.name(),
            entry
                .interval()
                .map_or("once".to_string(), |p| format!("every {}s", p.as_secs()))
        );
        let task = match entry.interval() {
            Some(period) => scheduler.fetch_interval(sensor, period, report),
            None => scheduler.fetch(sensor, report),
        };
        poller.push(task);
    }

    if let Some(duration) = args.duration {
        thread::sleep(duration);
        log_info!("duration elapsed, cancelling {} tasks", poller.len());
        poller.cancel_all();
    }

    let retired = poller.join().into_iter().flatten().count();
    log_info!("{} tasks retired", retired);
    scheduler.shutdown(SHUTDOWN_TIMEOUT);
}
