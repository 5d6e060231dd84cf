//! Core runtime services
//!
//! This module contains the pieces every sensor task relies on: the
//! logging macros and the polling scheduler.

pub mod logging;
pub mod scheduler;
