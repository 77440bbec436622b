#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::models::BrowserResult;
use crate::test_utils::MemoryFs;

fn reporter(fs: &Arc<MemoryFs>) -> JunitReporter {
    let config = Config {
        base_path: Some(PathBuf::from("/base")),
        ..Default::default()
    };
    JunitReporter::new(&config, Arc::clone(fs) as Arc<dyn Filesystem>).with_hostname("ci-host")
}

fn chrome() -> Browser {
    Browser::new("chrome-1", "Chrome 120.0 (Linux)")
}

fn firefox() -> Browser {
    Browser::new("firefox-1", "Firefox 121.0 (Linux)")
}

fn passed(suite: &str, description: &str, time: u64) -> SpecResult {
    SpecResult {
        suite: vec![suite.into(), "nested".into()],
        description: description.into(),
        time: Some(time as f64),
        success: true,
        ..Default::default()
    }
}

fn failed(suite: &str, description: &str, log: &[&str]) -> SpecResult {
    SpecResult {
        success: false,
        log: log.iter().map(|l| l.to_string()).collect(),
        ..passed(suite, description, 3)
    }
}

fn report_path() -> PathBuf {
    PathBuf::from("/base/test-results.xml")
}

fn exit_counter(reporter: &JunitReporter) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    reporter.on_exit(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

#[test]
fn run_start_creates_suite_per_listed_browser() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome(), firefox()]);
    r.on_browser_start(&chrome());

    let tree = r.run().unwrap().tree();
    assert_eq!(tree.browsers().len(), 2);
    let suite = tree.browser("chrome-1").unwrap();
    assert_eq!(suite.name, "Chrome 120.0 (Linux)");
    assert_eq!(suite.hostname, "ci-host");
    assert_eq!(suite.package, "");
    assert_eq!(suite.timestamp.len(), 19);
    assert_eq!(&suite.timestamp[10..11], "T");
}

#[test]
fn browser_start_is_idempotent() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[]);
    r.on_browser_start(&chrome());
    r.on_spec_complete(&chrome(), &passed("test.a.B", "one", 1));
    r.on_browser_start(&chrome());

    let tree = r.run().unwrap().tree();
    assert_eq!(tree.browsers().len(), 1);
    assert_eq!(tree.browsers()[0].suites().len(), 1);
}

#[test]
fn spec_results_accumulate_per_classname() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    r.spec_success(&chrome(), &passed("test.a.B", "one", 12));
    r.spec_success(&chrome(), &passed("test.a.C", "other", 7));
    r.spec_success(&chrome(), &passed("test.a.B", "two", 30));
    r.spec_success(&chrome(), &passed("test.a.B", "three", 0));

    let browser = r.run().unwrap().tree().browser("chrome-1").unwrap();
    assert_eq!(browser.suites().len(), 2);
    let suite = browser.find_suite("test.a.B.js").unwrap();
    assert_eq!(suite.name, "test.a.B");
    assert_eq!(suite.counters().tests, 3);
    assert!((suite.counters().time - 0.042).abs() < 1e-9);
    let names: Vec<_> = suite.cases().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["one", "two", "three"]);
}

#[test]
fn browsers_keep_separate_suites_for_the_same_classname() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome(), firefox()]);
    r.spec_success(&chrome(), &passed("test.a.B", "one", 1));
    r.spec_success(&firefox(), &passed("test.a.B", "one", 1));
    r.spec_success(&firefox(), &passed("test.a.B", "two", 1));

    let tree = r.run().unwrap().tree();
    let tests = |id: &str| {
        tree.browser(id)
            .unwrap()
            .find_suite("test.a.B.js")
            .unwrap()
            .counters()
            .tests
    };
    assert_eq!(tests("chrome-1"), 1);
    assert_eq!(tests("firefox-1"), 2);
}

#[test]
fn skipped_spec_adds_marker_and_counts_once() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    r.spec_skipped(
        &chrome(),
        &SpecResult {
            skipped: true,
            ..passed("test.a.B", "later", 0)
        },
    );

    let suite = r.run().unwrap().tree().browsers()[0].suites()[0].clone();
    assert_eq!(suite.counters().skipped, 1);
    assert_eq!(suite.counters().tests, 1);
    assert!(suite.cases()[0].skipped);
}

#[test]
fn failure_log_lines_are_classified_individually() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    r.spec_failure(
        &chrome(),
        &failed(
            "test.a.B",
            "breaks",
            &[
                "Expected true to be false\n    at Object.<anonymous> (test/a/B.js:4:20)",
                "TypeError: x is not a function\n    at test/a/B.js:9:3",
                "Expected 1 to be 2.",
            ],
        ),
    );

    let suite = &r.run().unwrap().tree().browsers()[0].suites()[0];
    let counters = suite.counters();
    assert_eq!(counters.tests, 1);
    assert_eq!(counters.failures, 2);
    assert_eq!(counters.errors, 1);
    assert_eq!(counters.failures + counters.errors, 3);

    let case = &suite.cases()[0];
    let messages: Vec<_> = case.outcomes.iter().map(|o| o.message()).collect();
    assert_eq!(
        messages,
        [
            "Expected true to be false",
            "Error while executing test",
            "Expected 1 to be 2."
        ]
    );
    assert!(case.system_err.as_deref().unwrap().contains("TypeError"));
}

#[test]
fn complete_for_unknown_browser_is_a_noop() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[]);
    r.on_browser_complete(&chrome());
    assert!(r.run().unwrap().tree().browsers().is_empty());

    let mut idle = reporter(&fs);
    idle.on_browser_complete(&chrome());
    assert!(idle.run().is_none());
}

#[test]
fn browser_complete_copies_final_result_and_messages() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[]);
    r.on_browser_start(&chrome());
    r.write_message("Chrome LOG: 'booted'");
    r.spec_success(&chrome(), &passed("test.a.B", "one", 1));

    let mut done = chrome();
    done.last_result = Some(BrowserResult {
        total: 4,
        disconnected: false,
        error: true,
        failed: 1,
        net_time: Some(1250.0),
    });
    r.on_browser_complete(&done);

    let run = r.run().unwrap();
    let suite = run.tree().browser("chrome-1").unwrap();
    let totals = suite.totals.as_ref().unwrap();
    assert_eq!(totals.tests, 4);
    assert_eq!(totals.errors, 1);
    assert_eq!(totals.failures, 1);
    assert_eq!(totals.time, 1.25);

    let system_out = suite.system_out.as_deref().unwrap();
    assert!(system_out.starts_with("Chrome LOG: 'booted'\nSonarqube may fail"));
    assert!(system_out.ends_with('\n'));
}

#[test]
fn missing_source_file_sets_sticky_naming_flag() {
    let fs = Arc::new(MemoryFs::new());
    fs.add_existing(PathBuf::from("/base").join("test").join("a").join("B.js"));
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);

    r.spec_success(&chrome(), &passed("test.a.B", "found", 1));
    assert!(!r.run().unwrap().naming_violated());
    assert!(r.run().unwrap().messages().is_empty());

    r.spec_success(&chrome(), &passed("login page", "missing", 1));
    r.spec_success(&chrome(), &passed("test.a.B", "found again", 1));
    let run = r.run().unwrap();
    assert!(run.naming_violated());
    assert_eq!(run.messages().len(), 1);
    assert!(run.messages()[0].contains("login page.js"));
}

#[test]
fn naming_check_runs_for_every_outcome() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    r.spec_success(&chrome(), &passed("a", "ok", 1));
    r.spec_skipped(
        &chrome(),
        &SpecResult {
            skipped: true,
            ..passed("a", "skip", 0)
        },
    );
    r.spec_failure(&chrome(), &failed("a", "bad", &["boom"]));
    assert_eq!(r.run().unwrap().messages().len(), 3);
}

#[test]
fn messages_before_run_start_open_the_next_run() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.write_message("early");
    r.on_run_start(&[chrome()]);
    r.write_message("late");
    assert_eq!(r.run().unwrap().messages(), ["early", "late"]);
}

#[test]
fn spec_for_unstarted_browser_creates_its_suite() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[]);
    r.spec_success(&firefox(), &passed("test.a.B", "one", 1));
    let tree = r.run().unwrap().tree();
    assert_eq!(tree.browsers().len(), 1);
    assert_eq!(tree.browsers()[0].id, "firefox-1");
}

#[test]
fn events_outside_a_run_are_dropped() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_browser_start(&chrome());
    r.spec_success(&chrome(), &passed("test.a.B", "one", 1));
    assert!(r.run().is_none());
    assert!(r.on_run_complete().is_none());
    assert_eq!(r.shutdown().pending(), 0);
}

#[tokio::test]
async fn run_complete_writes_report_and_releases_state() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    r.write_message("LOG: hello");
    r.spec_success(&chrome(), &passed("test.a.B", "works", 12));
    r.on_browser_complete(&chrome());

    let write = r.on_run_complete().expect("write issued");
    assert!(r.run().is_none());
    write.await.unwrap();

    let xml = fs.file(&report_path()).unwrap();
    assert!(xml.contains(
        r#"<testsuite name="test.a.B" time="0.012" tests="1" errors="0" failures="0" skipped="0" file="test.a.B.js">
      <testcase name="works" time="0.012"/>
    </testsuite>"#
    ));
    assert!(xml.contains(r#"<testsuite name="Chrome 120.0 (Linux)" package="""#));
    assert!(fs.created_dirs().contains(&PathBuf::from("/base")));

    // The next run starts from a clean slate.
    r.on_run_start(&[chrome()]);
    assert!(r.run().unwrap().messages().is_empty());
    assert!(r.run().unwrap().tree().browsers()[0].suites().is_empty());
}

#[tokio::test]
async fn exit_without_pending_writes_is_immediate() {
    let fs = Arc::new(MemoryFs::new());
    let r = reporter(&fs);
    let calls = exit_counter(&r);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exit_waits_for_the_pending_write() {
    let fs = Arc::new(MemoryFs::new());
    let release = fs.hold_next_write();
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    let write = r.on_run_complete().unwrap();

    let calls = exit_counter(&r);
    tokio::task::yield_now().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(r.shutdown().pending(), 1);

    release.send(()).unwrap();
    write.await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(r.shutdown().pending(), 0);
    assert!(fs.file(&report_path()).is_some());
}

#[tokio::test]
async fn failed_write_still_releases_exit() {
    let fs = Arc::new(MemoryFs::new());
    fs.fail_dirs();
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    let write = r.on_run_complete().unwrap();
    r.wait_for_writes().await;
    write.await.unwrap();
    assert_eq!(fs.file_count(), 0);
    assert_eq!(r.shutdown().pending(), 0);
}

#[tokio::test]
async fn events_dispatch_to_reporter_callbacks() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    let events = vec![
        ReporterEvent::Message {
            text: "starting".into(),
        },
        ReporterEvent::RunStart { browsers: vec![] },
        ReporterEvent::BrowserStart { browser: chrome() },
        ReporterEvent::SpecComplete {
            browser: chrome(),
            result: passed("test.a.B", "works", 5),
        },
        ReporterEvent::BrowserComplete { browser: chrome() },
    ];
    for event in events {
        assert!(handle_event(&mut r, event).is_none());
    }
    assert_eq!(r.run().unwrap().tree().totals().tests, 1);

    let write = handle_event(&mut r, ReporterEvent::RunComplete).unwrap();
    write.await.unwrap();
    let xml = fs.file(&report_path()).unwrap();
    assert!(xml.contains("<![CDATA[starting\n"));
}

#[test]
fn run_complete_outside_runtime_writes_synchronously() {
    let fs = Arc::new(MemoryFs::new());
    let mut r = reporter(&fs);
    r.on_run_start(&[chrome()]);
    assert!(r.on_run_complete().is_none());
    assert!(fs.file(&report_path()).is_some());
    assert_eq!(r.shutdown().pending(), 0);
}
