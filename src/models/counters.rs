/// Integer fields tracked on a suite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Tests,
    Failures,
    Errors,
    Skipped,
}

/// Running totals of a suite. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counters {
    pub tests: u64,
    pub failures: u64,
    pub errors: u64,
    pub skipped: u64,
    /// Seconds.
    pub time: f64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counter, amount: u64) {
        *self.slot(counter) += amount;
    }

    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Tests => self.tests,
            Counter::Failures => self.failures,
            Counter::Errors => self.errors,
            Counter::Skipped => self.skipped,
        }
    }

    pub fn add_time_ms(&mut self, ms: f64) {
        self.add_seconds(ms / 1000.0);
    }

    pub fn add_seconds(&mut self, seconds: f64) {
        self.time += seconds;
    }

    /// Fold another set of totals into this one.
    pub fn merge(&mut self, other: &Counters) {
        self.tests += other.tests;
        self.failures += other.failures;
        self.errors += other.errors;
        self.skipped += other.skipped;
        self.time += other.time;
    }

    fn slot(&mut self, counter: Counter) -> &mut u64 {
        match counter {
            Counter::Tests => &mut self.tests,
            Counter::Failures => &mut self.failures,
            Counter::Errors => &mut self.errors,
            Counter::Skipped => &mut self.skipped,
        }
    }
}
