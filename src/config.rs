use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Name of the configuration file looked up in the base directory.
pub const CONFIG_FILE: &str = "sonar-junit.toml";

pub const DEFAULT_OUTPUT_FILE: &str = "test-results.xml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Directory that relative paths (output file, spec naming check) resolve against.
    /// Defaults to the directory the config was loaded from.
    #[serde(default, alias = "basePath")]
    pub base_path: Option<PathBuf>,
    #[serde(default, alias = "junitReporter")]
    pub junit_reporter: ReporterConfig,
}

/// Options of the JUnit reporter itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ReporterConfig {
    /// Written as the `package` attribute of every browser-level testsuite.
    #[serde(default)]
    pub suite: String,
    /// Report location, relative to the base path unless absolute.
    /// Example: "reports/junit/test-results.xml"
    #[serde(default = "default_output_file", alias = "outputFile")]
    pub output_file: PathBuf,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            suite: String::new(),
            output_file: default_output_file(),
        }
    }
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

impl Config {
    /// Load `sonar-junit.toml` from `base`, falling back to defaults if absent or invalid.
    pub fn load(base: &Path) -> Self {
        let path = base.join(CONFIG_FILE);
        let Ok(content) = std::fs::read_to_string(&path) else {
            tracing::debug!("no config found at {}, using defaults", path.display());
            return Self::default().with_base(base);
        };
        match Self::from_toml(&content, &path) {
            Ok(config) => config.with_base(base),
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default().with_base(base)
            }
        }
    }

    /// Parse a config document. `origin` is only used for error messages.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            message: e.to_string(),
            path: origin.to_path_buf(),
        })
    }

    /// Fill in the base path when the file did not set one; relative ones are anchored at `base`.
    fn with_base(mut self, base: &Path) -> Self {
        self.base_path = Some(match self.base_path.take() {
            Some(p) if p.is_relative() => base.join(p),
            Some(p) => p,
            None => base.to_path_buf(),
        });
        self
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base_path.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    }

    /// Absolute location of the report file.
    pub fn output_path(&self) -> PathBuf {
        self.base_dir().join(&self.junit_reporter.output_file)
    }
}
