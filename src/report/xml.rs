//! JUnit XML rendering of a [`ReportTree`].

use std::borrow::Cow;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;

use crate::error::{Error, Result};
use crate::models::{BrowserSuite, ClassSuite, Outcome, ReportTree, TestCase};

pub const TAG_REPORT: &str = "testsuites";
pub const TAG_TEST_SUITE: &str = "testsuite";
pub const TAG_TEST_CASE: &str = "testcase";
pub const TAG_PROPERTIES: &str = "properties";
pub const TAG_PROPERTY: &str = "property";
pub const TAG_FAILURE: &str = "failure";
pub const TAG_ERROR: &str = "error";
pub const TAG_SKIPPED: &str = "skipped";
pub const TAG_SYSTEM_OUT: &str = "system-out";
pub const TAG_SYSTEM_ERR: &str = "system-err";

pub const PROPERTY_BROWSER_FULL_NAME: &str = "browser.fullName";

const INDENT: usize = 2;

/// Render the whole report as an indented XML document.
pub fn render(tree: &ReportTree) -> Result<String> {
    let mut out = XmlOut::new();
    out.event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    if tree.browsers().is_empty() {
        out.event(Event::Empty(BytesStart::new(TAG_REPORT)))?;
    } else {
        out.event(Event::Start(BytesStart::new(TAG_REPORT)))?;
        for browser in tree.browsers() {
            write_browser(&mut out, browser)?;
        }
        out.event(Event::End(BytesEnd::new(TAG_REPORT)))?;
    }
    out.finish()
}

fn write_browser(out: &mut XmlOut, browser: &BrowserSuite) -> Result<()> {
    let mut start = element(
        TAG_TEST_SUITE,
        &[
            ("name", browser.name.as_str()),
            ("package", browser.package.as_str()),
            ("timestamp", browser.timestamp.as_str()),
            ("id", "0"),
            ("hostname", browser.hostname.as_str()),
        ],
    );
    if let Some(totals) = &browser.totals {
        start.push_attribute(attr("tests", &totals.tests.to_string()));
        start.push_attribute(attr("errors", &totals.errors.to_string()));
        start.push_attribute(attr("failures", &totals.failures.to_string()));
        start.push_attribute(attr("time", &totals.time.to_string()));
    }
    out.event(Event::Start(start))?;

    out.event(Event::Start(BytesStart::new(TAG_PROPERTIES)))?;
    out.event(Event::Empty(element(
        TAG_PROPERTY,
        &[("name", PROPERTY_BROWSER_FULL_NAME), ("value", browser.full_name.as_str())],
    )))?;
    out.event(Event::End(BytesEnd::new(TAG_PROPERTIES)))?;

    for suite in browser.suites() {
        write_suite(out, suite)?;
    }

    if let Some(system_out) = &browser.system_out {
        out.cdata_element(TAG_SYSTEM_OUT, system_out)?;
        out.event(Event::Empty(BytesStart::new(TAG_SYSTEM_ERR)))?;
    }

    out.event(Event::End(BytesEnd::new(TAG_TEST_SUITE)))
}

fn write_suite(out: &mut XmlOut, suite: &ClassSuite) -> Result<()> {
    let counters = suite.counters();
    let start = element(
        TAG_TEST_SUITE,
        &[
            ("name", suite.name.as_str()),
            ("time", counters.time.to_string().as_str()),
            ("tests", counters.tests.to_string().as_str()),
            ("errors", counters.errors.to_string().as_str()),
            ("failures", counters.failures.to_string().as_str()),
            ("skipped", counters.skipped.to_string().as_str()),
            ("file", suite.file.as_str()),
        ],
    );
    if suite.cases().is_empty() {
        return out.event(Event::Empty(start));
    }
    out.event(Event::Start(start))?;
    for case in suite.cases() {
        write_case(out, case)?;
    }
    out.event(Event::End(BytesEnd::new(TAG_TEST_SUITE)))
}

fn write_case(out: &mut XmlOut, case: &TestCase) -> Result<()> {
    let start = element(
        TAG_TEST_CASE,
        &[("name", case.name.as_str()), ("time", case.time.to_string().as_str())],
    );
    if !case.skipped && case.outcomes.is_empty() && case.system_err.is_none() {
        return out.event(Event::Empty(start));
    }
    out.event(Event::Start(start))?;
    if case.skipped {
        out.event(Event::Empty(BytesStart::new(TAG_SKIPPED)))?;
    }
    for outcome in &case.outcomes {
        let tag = match outcome {
            Outcome::Failure { .. } => TAG_FAILURE,
            Outcome::Error => TAG_ERROR,
        };
        out.event(Event::Empty(element(tag, &[("msg", outcome.message())])))?;
    }
    if let Some(log) = &case.system_err {
        out.cdata_element(TAG_SYSTEM_ERR, log)?;
    }
    out.event(Event::End(BytesEnd::new(TAG_TEST_CASE)))
}

fn element<'a>(tag: &'a str, attrs: &[(&'a str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(tag);
    for &(key, value) in attrs {
        start.push_attribute(attr(key, value));
    }
    start
}

/// Attribute with its value escaped by hand so that line breaks survive
/// attribute-value normalization in readers.
fn attr<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escape_attr(value).into_bytes()),
    }
}

fn escape_attr(value: &str) -> String {
    let clean = sanitize(value);
    let mut out = String::with_capacity(clean.len());
    for c in clean.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            c => out.push(c),
        }
    }
    out
}

/// Wrap text in CDATA, splitting any `]]>` across two sections.
fn cdata(text: &str) -> String {
    format!(
        "<![CDATA[{}]]>",
        sanitize(text).replace("]]>", "]]]]><![CDATA[>")
    )
}

/// Drop ANSI escape sequences and characters XML 1.0 cannot carry.
pub fn sanitize(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c == '\x1b' || !is_xml_char(c)) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until we hit a letter (end of escape sequence)
            for c2 in chars.by_ref() {
                if c2.is_ascii_alphabetic() {
                    break;
                }
            }
        } else if is_xml_char(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', INDENT),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::Render(e.to_string()))
    }

    /// `<tag><![CDATA[text]]></tag>` on a single indented line, so the
    /// content carries no indentation whitespace.
    fn cdata_element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.writer
            .write_indent()
            .map_err(|e| Error::Render(e.to_string()))?;
        write!(self.writer.get_mut(), "<{tag}>{}</{tag}>", cdata(text))
            .map_err(|e| Error::Render(e.to_string()))
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| Error::Render(e.to_string()))
    }
}
