use tokio::task::JoinHandle;

use super::JunitReporter;
use crate::models::{Browser, SpecResult};

/// Events a test runner reports while it executes.
#[derive(Debug, Clone, PartialEq)]
pub enum ReporterEvent {
    RunStart {
        browsers: Vec<Browser>,
    },
    BrowserStart {
        browser: Browser,
    },
    /// `browser.last_result` carries the final aggregate.
    BrowserComplete {
        browser: Browser,
    },
    /// A spec finished: passed, skipped or failed.
    SpecComplete {
        browser: Browser,
        result: SpecResult,
    },
    /// Diagnostic output to capture in `system-out`.
    Message {
        text: String,
    },
    RunComplete,
}

/// Apply one runner event. Returns the report write task when the event
/// completed the run.
pub fn handle_event(reporter: &mut JunitReporter, event: ReporterEvent) -> Option<JoinHandle<()>> {
    match event {
        ReporterEvent::RunStart { browsers } => {
            reporter.on_run_start(&browsers);
        }

        ReporterEvent::BrowserStart { browser } => {
            reporter.on_browser_start(&browser);
        }

        ReporterEvent::BrowserComplete { browser } => {
            reporter.on_browser_complete(&browser);
        }

        ReporterEvent::SpecComplete { browser, result } => {
            reporter.on_spec_complete(&browser, &result);
        }

        ReporterEvent::Message { text } => {
            reporter.write_message(text);
        }

        ReporterEvent::RunComplete => return reporter.on_run_complete(),
    }
    None
}
