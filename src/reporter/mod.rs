use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::Config;
use crate::fs::Filesystem;
use crate::models::{Browser, BrowserSuite, ReportTree, SpecResult, TestCase};
use crate::naming::{NAMING_HINT, SuiteName};
use crate::report;

pub mod events;
pub mod shutdown;

pub use events::{ReporterEvent, handle_event};
pub use shutdown::{PendingWrite, Shutdown};

/// State of one reporting session, from run start to run completion.
#[derive(Debug, Default)]
pub struct Run {
    tree: ReportTree,
    /// Every diagnostic message seen so far, in arrival order.
    messages: Vec<String>,
    /// Set by the first suite whose source file is missing; never cleared.
    naming_violated: bool,
}

impl Run {
    fn new(messages: Vec<String>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &ReportTree {
        &self.tree
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn naming_violated(&self) -> bool {
        self.naming_violated
    }

    fn system_out(&self) -> String {
        let mut out = self.messages.join("\n");
        out.push('\n');
        out
    }
}

/// Collects runner events into a JUnit report, one `<testsuite>` per browser
/// and per test file, and writes it when the run completes.
pub struct JunitReporter {
    package: String,
    base_dir: PathBuf,
    output_path: PathBuf,
    hostname: String,
    fs: Arc<dyn Filesystem>,
    run: Option<Run>,
    /// Messages received while no run was active; they open the next run's log.
    backlog: Vec<String>,
    shutdown: Shutdown,
}

impl JunitReporter {
    pub fn new(config: &Config, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            package: config.junit_reporter.suite.clone(),
            base_dir: config.base_dir(),
            output_path: config.output_path(),
            hostname: crate::host::hostname(),
            fs,
            run: None,
            backlog: Vec::new(),
            shutdown: Shutdown::new(),
        }
    }

    /// Override the host name written into every browser suite.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The active run, if any.
    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Start a new run. Browsers known up front get their suite right away.
    pub fn on_run_start(&mut self, browsers: &[Browser]) {
        if self.run.is_some() {
            tracing::debug!("run restarted before completion, discarding collected results");
        }
        let mut run = Run::new(std::mem::take(&mut self.backlog));
        for browser in browsers {
            init_browser(&mut run.tree, browser, &self.package, &self.hostname);
        }
        self.run = Some(run);
    }

    pub fn on_browser_start(&mut self, browser: &Browser) {
        let Some(run) = self.run.as_mut() else {
            tracing::warn!("browser {} started outside of a run, ignored", browser.name);
            return;
        };
        init_browser(&mut run.tree, browser, &self.package, &self.hostname);
    }

    /// Copy the browser's final result onto its suite.
    ///
    /// Browsers that never signalled a start (e.g. timed out while launching)
    /// are ignored.
    pub fn on_browser_complete(&mut self, browser: &Browser) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let system_out = run.system_out();
        let Some(suite) = run.tree.browser_mut(&browser.id) else {
            tracing::debug!("browser {} completed without starting", browser.name);
            return;
        };
        let result = browser.last_result.clone().unwrap_or_default();
        suite.finalize(&result, system_out);

        if run.naming_violated {
            tracing::warn!("{}", NAMING_HINT);
        }
    }

    /// Record one spec result. Success, skip and failure all go through here.
    pub fn on_spec_complete(&mut self, browser: &Browser, result: &SpecResult) {
        let Some(run) = self.run.as_mut() else {
            tracing::warn!(
                "result for \"{}\" arrived outside of a run, ignored",
                result.description
            );
            return;
        };
        let idx = match run.tree.find_browser(&browser.id) {
            Some(idx) => idx,
            None => init_browser(&mut run.tree, browser, &self.package, &self.hostname),
        };

        let name = SuiteName::new(result.suite_name());
        if let Some(warning) = name.check_source_file(self.fs.as_ref(), &self.base_dir) {
            tracing::warn!("{}", warning);
            run.messages.push(warning);
            run.naming_violated = true;
        }

        if let Some(suite) = run.tree.get_mut(idx) {
            suite
                .suite_or_insert(name)
                .push(TestCase::from_result(result));
        }
    }

    pub fn spec_success(&mut self, browser: &Browser, result: &SpecResult) {
        self.on_spec_complete(browser, result);
    }

    pub fn spec_skipped(&mut self, browser: &Browser, result: &SpecResult) {
        self.on_spec_complete(browser, result);
    }

    pub fn spec_failure(&mut self, browser: &Browser, result: &SpecResult) {
        self.on_spec_complete(browser, result);
    }

    /// Append a diagnostic message to the log captured in `system-out`.
    pub fn write_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.run.as_mut() {
            Some(run) => run.messages.push(message),
            None => self.backlog.push(message),
        }
    }

    /// Render the run and issue the report write.
    ///
    /// The collected results are released as soon as the document is
    /// rendered; the write itself runs in the background and is tracked by
    /// [`Shutdown`]. Returns the write task, or None when nothing was issued.
    pub fn on_run_complete(&mut self) -> Option<JoinHandle<()>> {
        let Some(run) = self.run.take() else {
            tracing::warn!("run completed before it started, no JUnit report written");
            return None;
        };

        let totals = run.tree.totals();
        tracing::debug!(
            "rendering JUnit report: {} browsers, {} tests, {} failures, {} errors, {} skipped",
            run.tree.browsers().len(),
            totals.tests,
            totals.failures,
            totals.errors,
            totals.skipped
        );
        let xml = match report::render(&run.tree) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!("Cannot write JUnit xml\n\t{}", e);
                return None;
            }
        };
        drop(run);

        let pending = self.shutdown.begin_write();
        let fs = Arc::clone(&self.fs);
        let path = self.output_path.clone();
        let write = async move {
            report::write_report_logged(fs.as_ref(), &path, xml).await;
            drop(pending);
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(write)),
            Err(_) => {
                // Not inside a runtime: finish the write before returning.
                match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt.block_on(write),
                    Err(e) => tracing::warn!("Cannot write JUnit xml\n\t{}", e),
                }
                None
            }
        }
    }

    /// Call `done` once every issued report write has finished.
    pub fn on_exit<F>(&self, done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shutdown.on_exit(done);
    }

    /// Async form of [`JunitReporter::on_exit`].
    pub async fn wait_for_writes(&self) {
        self.shutdown.wait().await;
    }
}

/// Add the suite for `browser` unless it exists. Returns its index.
fn init_browser(tree: &mut ReportTree, browser: &Browser, package: &str, hostname: &str) -> usize {
    if let Some(idx) = tree.find_browser(&browser.id) {
        return idx;
    }
    tree.add_browser(BrowserSuite::new(browser, package, hostname, timestamp_now()))
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS`.
fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests;
