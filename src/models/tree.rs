use std::collections::HashMap;

use super::counters::{Counter, Counters};
use super::outcome::Outcome;
use super::result::{Browser, BrowserResult, SpecResult};
use crate::naming::SuiteName;

/// Everything collected during one run: one suite per browser.
#[derive(Debug, Default)]
pub struct ReportTree {
    browsers: Vec<BrowserSuite>,
}

impl ReportTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a browser suite. Returns its index.
    pub fn add_browser(&mut self, suite: BrowserSuite) -> usize {
        let idx = self.browsers.len();
        self.browsers.push(suite);
        idx
    }

    /// Find a browser suite by browser id, or None.
    pub fn find_browser(&self, id: &str) -> Option<usize> {
        self.browsers.iter().position(|b| b.id == id)
    }

    pub fn browser(&self, id: &str) -> Option<&BrowserSuite> {
        self.browsers.iter().find(|b| b.id == id)
    }

    pub fn browser_mut(&mut self, id: &str) -> Option<&mut BrowserSuite> {
        self.browsers.iter_mut().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut BrowserSuite> {
        self.browsers.get_mut(idx)
    }

    pub fn browsers(&self) -> &[BrowserSuite] {
        &self.browsers
    }

    /// Sum of every suite's counters across all browsers.
    pub fn totals(&self) -> Counters {
        let mut totals = Counters::new();
        for suite in self.browsers.iter().flat_map(|b| b.suites()) {
            totals.merge(suite.counters());
        }
        totals
    }
}

/// Top-level `<testsuite>` describing one browser's whole execution.
#[derive(Debug, Clone)]
pub struct BrowserSuite {
    pub id: String,
    pub name: String,
    pub package: String,
    /// ISO-8601, seconds precision, no zone suffix.
    pub timestamp: String,
    pub hostname: String,
    pub full_name: String,
    suites: Vec<ClassSuite>,
    index: HashMap<String, usize>,
    /// Set once the browser completes.
    pub totals: Option<BrowserTotals>,
    pub system_out: Option<String>,
}

impl BrowserSuite {
    pub fn new(browser: &Browser, package: &str, hostname: &str, timestamp: String) -> Self {
        Self {
            id: browser.id.clone(),
            name: browser.name.clone(),
            package: package.to_string(),
            timestamp,
            hostname: hostname.to_string(),
            full_name: browser.full_name.clone(),
            suites: Vec::new(),
            index: HashMap::new(),
            totals: None,
            system_out: None,
        }
    }

    pub fn suites(&self) -> &[ClassSuite] {
        &self.suites
    }

    /// Find a suite by classname (e.g. `test.a.B.js`), or None.
    pub fn find_suite(&self, classname: &str) -> Option<&ClassSuite> {
        self.index.get(classname).map(|&idx| &self.suites[idx])
    }

    /// Return the suite for `name`, creating it on first use.
    pub fn suite_or_insert(&mut self, name: SuiteName<'_>) -> &mut ClassSuite {
        let classname = name.classname();
        let idx = match self.index.get(&classname) {
            Some(&idx) => idx,
            None => {
                let idx = self.suites.len();
                self.suites.push(ClassSuite::new(name));
                self.index.insert(classname, idx);
                idx
            }
        };
        &mut self.suites[idx]
    }

    /// Record the runner's aggregate result and the captured output.
    pub fn finalize(&mut self, result: &BrowserResult, system_out: String) {
        self.totals = Some(BrowserTotals::from(result));
        self.system_out = Some(system_out);
    }

    pub fn is_complete(&self) -> bool {
        self.totals.is_some()
    }
}

/// Aggregate attributes copied from the runner when a browser completes.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserTotals {
    pub tests: u64,
    /// 1 when the browser disconnected or errored, else 0.
    pub errors: u64,
    pub failures: u64,
    /// Seconds.
    pub time: f64,
}

impl From<&BrowserResult> for BrowserTotals {
    fn from(result: &BrowserResult) -> Self {
        Self {
            tests: result.total,
            errors: u64::from(result.disconnected || result.error),
            failures: result.failed,
            time: result.net_time.unwrap_or(0.0) / 1000.0,
        }
    }
}

/// Nested `<testsuite>` grouping the specs of one source file.
#[derive(Debug, Clone)]
pub struct ClassSuite {
    pub name: String,
    pub file: String,
    counters: Counters,
    cases: Vec<TestCase>,
}

impl ClassSuite {
    pub fn new(name: SuiteName<'_>) -> Self {
        Self {
            name: name.as_str().to_string(),
            file: name.classname(),
            counters: Counters::new(),
            cases: Vec::new(),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Append a test case and account for it in the running totals.
    pub fn push(&mut self, case: TestCase) {
        self.counters.increment(Counter::Tests);
        self.counters.add_seconds(case.time);
        if case.skipped {
            self.counters.increment(Counter::Skipped);
        }
        for outcome in &case.outcomes {
            if outcome.is_failure() {
                self.counters.increment(Counter::Failures);
            } else {
                self.counters.increment(Counter::Errors);
            }
        }
        self.cases.push(case);
    }
}

/// One `<testcase>`. Built in full from a spec result, never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    /// Seconds.
    pub time: f64,
    pub skipped: bool,
    /// One entry per failure log line, in log order.
    pub outcomes: Vec<Outcome>,
    /// Raw failure log, present for unsuccessful specs.
    pub system_err: Option<String>,
}

impl TestCase {
    pub fn from_result(result: &SpecResult) -> Self {
        let (outcomes, system_err) = if result.success {
            (Vec::new(), None)
        } else {
            (
                result.log.iter().map(|line| Outcome::classify(line)).collect(),
                Some(result.log.join("\n")),
            )
        };
        Self {
            name: result.description.clone(),
            time: result.seconds(),
            skipped: result.skipped,
            outcomes,
            system_err,
        }
    }
}
