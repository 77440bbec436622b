//! Mapping between suite names and test source files.
//!
//! Report consumers locate test files from the suite name:
//! `describe("test.com.company.BarTest")` must live in `test/com/company/BarTest.js`.

use std::path::{Path, PathBuf};

use crate::fs::Filesystem;

/// Suffix of test source files.
pub const SOURCE_SUFFIX: &str = ".js";

/// Namespace separator inside suite names.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Logged when a browser completes after a naming violation was seen.
pub const NAMING_HINT: &str = "The spec name should map to the file structure: describe(\"test.com.company.BarTest\") → test/com/company/BarTest.js";

/// A first-level suite name, as written in the outermost `describe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteName<'a>(&'a str);

impl<'a> SuiteName<'a> {
    pub fn new(name: &'a str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Lookup key and `file` attribute: `test.a.B` → `test.a.B.js`.
    pub fn classname(&self) -> String {
        format!("{}{}", self.0, SOURCE_SUFFIX)
    }

    /// Conventional source location: `test.a.B` → `test/a/B.js`.
    pub fn source_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        let mut segments = self.0.split(NAMESPACE_SEPARATOR).peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{}{}", segment, SOURCE_SUFFIX));
            }
        }
        path
    }

    pub fn resolve(&self, base: &Path) -> PathBuf {
        base.join(self.source_path())
    }

    /// Check that the conventional source file exists under `base`.
    /// Returns the warning to record when it does not.
    pub fn check_source_file(&self, fs: &dyn Filesystem, base: &Path) -> Option<String> {
        let path = self.resolve(base);
        if fs.exists(&path) {
            None
        } else {
            Some(format!(
                "Sonarqube may fail to parse this report since the test file was not found at {}",
                path.display()
            ))
        }
    }
}
