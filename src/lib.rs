//! JUnit XML reporting for browser test runs.
//!
//! A [`JunitReporter`] observes a test runner's events (run start, browser
//! start/complete, spec results), groups results per browser and per test
//! source file, and writes a SonarQube-friendly JUnit report when the run
//! completes. [`runner::stream_events`] drives it from a newline-delimited JSON
//! event stream.

pub mod config;
pub mod error;
pub mod fs;
pub mod host;
pub mod models;
pub mod naming;
pub mod report;
pub mod reporter;
pub mod runner;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{Error, Result};
pub use fs::{Filesystem, TokioFs};
pub use reporter::{JunitReporter, ReporterEvent, Shutdown, handle_event};
