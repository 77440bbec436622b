use serde::{Deserialize, Serialize};

/// A browser (or other execution environment) as reported by the runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Browser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    /// Aggregate result, filled in by the runner once the browser completes.
    #[serde(default)]
    pub last_result: Option<BrowserResult>,
}

impl Browser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            full_name: name.clone(),
            name,
            last_result: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserResult {
    pub total: u64,
    pub disconnected: bool,
    pub error: bool,
    pub failed: u64,
    /// Milliseconds spent executing specs.
    pub net_time: Option<f64>,
}

/// Outcome of one executed spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecResult {
    /// Enclosing describe blocks, outermost first.
    pub suite: Vec<String>,
    pub description: String,
    /// Elapsed milliseconds, possibly fractional.
    pub time: Option<f64>,
    pub skipped: bool,
    pub success: bool,
    /// Failure messages with stack traces; empty on success.
    pub log: Vec<String>,
}

impl SpecResult {
    /// Name used to group this spec into a report suite.
    pub fn suite_name(&self) -> &str {
        self.suite.first().map(String::as_str).unwrap_or_default()
    }

    pub fn seconds(&self) -> f64 {
        self.time.unwrap_or(0.0) / 1000.0
    }
}
