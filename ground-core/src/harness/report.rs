//! Per-adapter results and the run summary.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::contract::CapabilityGap;

/// Where an adapter's turn failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Setup,
    Scenario,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Setup => f.write_str("setup"),
            Stage::Scenario => f.write_str("scenario"),
        }
    }
}

/// A structured failure: message plus optional cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl Failure {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            trace: None,
        }
    }

    /// Build from an error, keeping its `source()` chain as the trace.
    pub fn from_error(stage: Stage, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            stage,
            message: err.to_string(),
            trace: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

/// Outcome of running the scenario against one adapter.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub adapter: String,
    pub success: bool,
    #[serde(rename = "duration_ms", serialize_with = "millis")]
    pub duration: Duration,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
    pub gaps: Vec<CapabilityGap>,
}

impl TestResult {
    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }
}

fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Every result of one run, in registry order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub results: Vec<TestResult>,
}

impl RunReport {
    pub fn new(scenario: impl Into<String>, results: Vec<TestResult>) -> Self {
        Self {
            scenario: scenario.into(),
            results,
        }
    }

    pub fn successful(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|result| result.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|result| !result.success)
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|result| result.success)
    }

    pub fn result(&self, adapter: &str) -> Option<&TestResult> {
        self.results
            .iter()
            .find(|result| result.adapter.eq_ignore_ascii_case(adapter))
    }

    /// Adapter name to elapsed time, in run order.
    pub fn durations(&self) -> IndexMap<&str, Duration> {
        self.results
            .iter()
            .map(|result| (result.adapter.as_str(), result.duration))
            .collect()
    }

    /// Process exit status: 0 when everything passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.results.len();
        let passed: Vec<_> = self.successful().collect();
        let failed: Vec<_> = self.failed().collect();

        writeln!(f, "Summary for `{}`", self.scenario)?;
        writeln!(f, "Successful: {}/{}", passed.len(), total)?;
        for result in &passed {
            writeln!(f, "  - {}: {}ms", result.adapter, result.duration_ms())?;
        }

        if !failed.is_empty() {
            writeln!(f, "Failed: {}/{}", failed.len(), total)?;
            for result in &failed {
                match &result.error {
                    Some(error) => writeln!(f, "  - {}: {}", result.adapter, error)?,
                    None => writeln!(f, "  - {}", result.adapter)?,
                }
            }
        }

        let degraded: Vec<_> = self
            .results
            .iter()
            .filter(|result| !result.gaps.is_empty())
            .collect();
        if !degraded.is_empty() {
            writeln!(f, "Capability gaps:")?;
            for result in degraded {
                let gaps: Vec<_> = result.gaps.iter().map(|gap| gap.describe()).collect();
                writeln!(f, "  - {}: {}", result.adapter, gaps.join("; "))?;
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(adapter: &str, success: bool, millis: u64) -> TestResult {
        TestResult {
            adapter: adapter.to_string(),
            success,
            duration: Duration::from_millis(millis),
            output: "line one\nline two".to_string(),
            error: (!success).then(|| Failure::new(Stage::Scenario, "expected 4, got 3")),
            gaps: Vec::new(),
        }
    }

    #[test]
    fn partitions_results() {
        let report = RunReport::new(
            "basics",
            vec![result("a", true, 3), result("b", false, 5), result("c", true, 1)],
        );
        assert_eq!(report.successful().count(), 2);
        assert_eq!(report.failed().count(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn summary_lists_durations_and_failures() {
        let mut report = RunReport::new(
            "basics",
            vec![result("Arc", true, 12), result("Arena", false, 4)],
        );
        report.results[0].gaps.push(CapabilityGap::NoBatch);

        let summary = report.to_string();
        assert!(summary.contains("Successful: 1/2"));
        assert!(summary.contains("  - Arc: 12ms"));
        assert!(summary.contains("Failed: 1/2"));
        assert!(summary.contains("  - Arena: scenario failed: expected 4, got 3"));
        assert!(summary.contains("  - Arc: batch() runs the block inline"));
    }

    #[test]
    fn json_reports_milliseconds() {
        let report = RunReport::new("basics", vec![result("Arc", true, 1500)]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["results"][0]["duration_ms"], 1500);
        assert!(json["results"][0].get("error").is_none());
    }

    #[test]
    fn error_chain_becomes_trace() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = crate::error::HarnessError::ConfigRead {
            path: "ground.toml".into(),
            source: io,
        };
        let failure = Failure::from_error(Stage::Setup, &err);
        assert!(failure.message.starts_with("failed to read config"));
        assert_eq!(failure.trace.as_deref(), Some("caused by: disk gone"));
    }

    #[test]
    fn lookup_ignores_case() {
        let report = RunReport::new("basics", vec![result("Leptos Arc Signals", true, 1)]);
        assert!(report.result("leptos arc signals").is_some());
    }
}
