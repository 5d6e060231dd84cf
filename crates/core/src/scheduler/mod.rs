//! Task scheduler statistics
//!
//! The polling scheduler itself lives in the host crate on top of tokio.
//! This module only holds the bookkeeping it updates after every cycle,
//! so the arithmetic can be tested without a runtime.
//!
//! # Components
//!
//! - [`types`]: Per-task statistics (TaskStats)

pub mod types;

pub use types::*;
