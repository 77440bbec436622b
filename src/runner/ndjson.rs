use serde::Deserialize;

use crate::models::{Browser, SpecResult};
use crate::reporter::ReporterEvent;

// --- NDJSON deserialization types ---

/// One line of the runner's event stream.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RunnerEvent {
    RunStart {
        #[serde(default)]
        browsers: Vec<Browser>,
    },
    BrowserStart {
        browser: Browser,
    },
    BrowserComplete {
        browser: Browser,
    },
    SpecSuccess {
        browser: Browser,
        result: SpecResult,
    },
    SpecSkipped {
        browser: Browser,
        result: SpecResult,
    },
    SpecFailure {
        browser: Browser,
        result: SpecResult,
    },
    BrowserLog {
        #[serde(default)]
        browser: Option<Browser>,
        #[serde(alias = "message")]
        log: String,
        #[serde(rename = "logType", default = "default_log_type")]
        log_type: String,
    },
    Message {
        text: String,
    },
    RunComplete,
}

/// `type` tags of [`RunnerEvent`].
const EVENT_TYPES: &[&str] = &[
    "run-start",
    "browser-start",
    "browser-complete",
    "spec-success",
    "spec-skipped",
    "spec-failure",
    "browser-log",
    "message",
    "run-complete",
];

#[derive(Deserialize)]
struct EventTag {
    #[serde(rename = "type")]
    kind: String,
}

fn default_log_type() -> String {
    "log".to_string()
}

impl RunnerEvent {
    pub fn into_reporter_event(self) -> ReporterEvent {
        match self {
            RunnerEvent::RunStart { browsers } => ReporterEvent::RunStart { browsers },
            RunnerEvent::BrowserStart { browser } => ReporterEvent::BrowserStart { browser },
            RunnerEvent::BrowserComplete { browser } => ReporterEvent::BrowserComplete { browser },
            RunnerEvent::SpecSuccess { browser, result }
            | RunnerEvent::SpecSkipped { browser, result }
            | RunnerEvent::SpecFailure { browser, result } => {
                ReporterEvent::SpecComplete { browser, result }
            }
            RunnerEvent::BrowserLog {
                browser,
                log,
                log_type,
            } => {
                let level = log_type.to_uppercase();
                let text = match browser {
                    Some(b) => format!("{} {}: {}", b.name, level, log),
                    None => format!("{}: {}", level, log),
                };
                ReporterEvent::Message { text }
            }
            RunnerEvent::Message { text } => ReporterEvent::Message { text },
            RunnerEvent::RunComplete => ReporterEvent::RunComplete,
        }
    }
}

/// Decode one stream line. Anything that is not a known event (e.g. a banner
/// printed by the runner) is kept verbatim as a diagnostic message. A known
/// event with a payload that does not decode is dropped with a warning.
pub fn decode_line(line: &str) -> Option<ReporterEvent> {
    let known = serde_json::from_str::<EventTag>(line)
        .is_ok_and(|tag| EVENT_TYPES.contains(&tag.kind.as_str()));
    if !known {
        return Some(ReporterEvent::Message {
            text: line.to_string(),
        });
    }

    match serde_json::from_str::<RunnerEvent>(line) {
        Ok(event) => Some(event.into_reporter_event()),
        Err(e) => {
            tracing::warn!("Dropping malformed runner event: {e}\n\t{line}");
            None
        }
    }
}
