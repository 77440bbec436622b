/// Separates a failure message from its stack trace in runner log lines.
pub const STACK_TRACE_MARKER: &str = "\n    at ";

/// Assertion libraries (Jasmine, expect.js) start their messages with this.
pub const ASSERTION_PREFIX: &str = "Expected";

/// Message written for every non-assertion failure.
pub const EXECUTION_ERROR_MESSAGE: &str = "Error while executing test";

/// Classification of one failure log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An assertion did not hold. Carries the message without the stack trace.
    Failure { message: String },
    /// The spec threw before or outside of an assertion.
    Error,
}

impl Outcome {
    /// Classify a log line by its text ahead of the first stack frame.
    ///
    /// This is a prefix heuristic: assertion libraries whose messages do not
    /// start with `Expected` are reported as errors.
    pub fn classify(line: &str) -> Self {
        let head = line
            .split_once(STACK_TRACE_MARKER)
            .map_or(line, |(head, _)| head);
        if head.starts_with(ASSERTION_PREFIX) {
            Outcome::Failure {
                message: head.to_string(),
            }
        } else {
            Outcome::Error
        }
    }

    /// Text for the `msg` attribute of the emitted element.
    pub fn message(&self) -> &str {
        match self {
            Outcome::Failure { message } => message,
            Outcome::Error => EXECUTION_ERROR_MESSAGE,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assertion_message_is_a_failure() {
        let outcome =
            Outcome::classify("Expected true to be false\n    at Object.<anonymous> (test/a.js:3:18)");
        assert_eq!(
            outcome,
            Outcome::Failure {
                message: "Expected true to be false".into()
            }
        );
        assert_eq!(outcome.message(), "Expected true to be false");
    }

    #[test]
    fn thrown_exception_is_an_error() {
        let outcome = Outcome::classify("TypeError: x is not a function\n    at foo (test/a.js:9:1)");
        assert_eq!(outcome, Outcome::Error);
        assert_eq!(outcome.message(), "Error while executing test");
    }

    #[test]
    fn line_without_stack_trace_uses_whole_text() {
        assert_eq!(
            Outcome::classify("Expected 1 to equal 2."),
            Outcome::Failure {
                message: "Expected 1 to equal 2.".into()
            }
        );
    }

    #[test]
    fn only_the_first_marker_splits() {
        let outcome = Outcome::classify("Expected a\nb\n    at one\n    at two");
        assert_eq!(outcome.message(), "Expected a\nb");
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert!(!Outcome::classify("expected lowercase").is_failure());
        assert!(!Outcome::classify("  Expected indented").is_failure());
    }
}
