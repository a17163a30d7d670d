//! Test result models
//!
//! Outcome of a rendering test and the summary of a batch of tests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single rendering test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Index reported by the engine, unset when the engine returned nothing
    pub test_index: Option<i32>,
    pub passed: bool,
    /// Average frames per second, meaningful only when passed
    pub average_fps: f64,
    /// Error description, empty when passed
    pub error_message: String,
    /// Duration reported by the engine in seconds
    pub duration_secs: i32,
}

impl TestResult {
    pub fn pass(test_index: i32, average_fps: f64) -> Self {
        Self {
            test_index: Some(test_index),
            passed: true,
            average_fps,
            error_message: String::new(),
            duration_secs: 0,
        }
    }

    pub fn fail(test_index: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            test_index,
            passed: false,
            average_fps: 0.0,
            error_message: message.into(),
            duration_secs: 0,
        }
    }

    pub fn with_duration(mut self, duration_secs: i32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn symbol(&self) -> &'static str {
        if self.passed {
            "✓"
        } else {
            "✗"
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self
            .test_index
            .map(|i| i.to_string())
            .unwrap_or_else(|| "-".to_string());
        if self.passed {
            write!(
                f,
                "{} Test {}: {:.2} FPS",
                self.symbol(),
                index,
                self.average_fps
            )
        } else {
            write!(
                f,
                "{} Test {}: FAILED - {}",
                self.symbol(),
                index,
                self.error_message
            )
        }
    }
}

/// Summary over a sequence of test results
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestRunSummary {
    pub name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Average FPS over passing tests
    pub average_fps: Option<f64>,
    pub min_fps: Option<f64>,
    pub max_fps: Option<f64>,
    pub results: Vec<TestResult>,
}

impl TestRunSummary {
    pub fn new(name: impl Into<String>, results: Vec<TestResult>) -> Self {
        let total = results.len();
        let fps: Vec<f64> = results
            .iter()
            .filter(|r| r.passed)
            .map(|r| r.average_fps)
            .collect();
        let passed = fps.len();

        let average_fps = if fps.is_empty() {
            None
        } else {
            Some(fps.iter().sum::<f64>() / fps.len() as f64)
        };
        let min_fps = fps.iter().cloned().reduce(f64::min);
        let max_fps = fps.iter().cloned().reduce(f64::max);

        Self {
            name: name.into(),
            total,
            passed,
            failed: total - passed,
            average_fps,
            min_fps,
            max_fps,
            results,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for TestRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {}",
            self.total, self.passed, self.failed
        )?;
        match self.average_fps {
            Some(avg) => writeln!(
                f,
                "Pass Rate: {:.1}% | Average: {:.2} FPS",
                self.pass_rate(),
                avg
            ),
            None => writeln!(f, "Pass Rate: {:.1}%", self.pass_rate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_creation() {
        let result = TestResult::pass(3, 59.97);
        assert!(result.passed);
        assert_eq!(result.test_index, Some(3));
        assert!(result.error_message.is_empty());

        let failed = TestResult::fail(Some(1), "DEVICE_LOST");
        assert!(!failed.passed);
        assert_eq!(failed.average_fps, 0.0);
        assert_eq!(failed.error_message, "DEVICE_LOST");
    }

    #[test]
    fn test_result_display() {
        assert_eq!(TestResult::pass(2, 120.0).to_string(), "✓ Test 2: 120.00 FPS");
        assert_eq!(
            TestResult::fail(None, "No test results returned").to_string(),
            "✗ Test -: FAILED - No test results returned"
        );
    }

    #[test]
    fn test_run_summary() {
        let results = vec![
            TestResult::pass(0, 100.0),
            TestResult::pass(1, 50.0),
            TestResult::fail(Some(2), "DEVICE_LOST"),
        ];

        let summary = TestRunSummary::new("comparison", results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.average_fps, Some(75.0));
        assert_eq!(summary.min_fps, Some(50.0));
        assert_eq!(summary.max_fps, Some(100.0));
        assert!(!summary.is_all_passed());
    }

    #[test]
    fn test_run_summary_without_passes() {
        let summary = TestRunSummary::new("empty", vec![TestResult::fail(None, "x")]);
        assert_eq!(summary.average_fps, None);
        assert_eq!(summary.pass_rate(), 0.0);
    }
}
