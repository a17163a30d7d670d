//! Report generation for test results
//!
//! Generate formatted reports for stored runs.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::results::storage::{StoredEntry, StoredRun};

/// Report generator
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate a report for a run
    pub fn run_report(run: &StoredRun, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => Self::format_text_report(run),
            ReportFormat::Markdown => Self::format_markdown_report(run),
        }
    }

    /// Relative change of `value` against `base`, in percent
    pub fn delta_percent(base: f64, value: f64) -> Option<f64> {
        if base > 0.0 {
            Some((value - base) / base * 100.0)
        } else {
            None
        }
    }

    /// Per-entry change against the first entry. `None` when either side failed.
    pub fn deltas(entries: &[StoredEntry]) -> Vec<Option<f64>> {
        let base = entries
            .first()
            .filter(|e| e.result.passed)
            .map(|e| e.result.average_fps);

        entries
            .iter()
            .map(|entry| match base {
                Some(base) if entry.result.passed => {
                    Self::delta_percent(base, entry.result.average_fps)
                }
                _ => None,
            })
            .collect()
    }

    /// Mean FPS over passing entries with the number of passing entries
    pub fn average_score(entries: &[StoredEntry]) -> Option<(f64, usize)> {
        let fps: Vec<f64> = entries
            .iter()
            .filter(|e| e.result.passed)
            .map(|e| e.result.average_fps)
            .collect();
        if fps.is_empty() {
            None
        } else {
            Some((fps.iter().sum::<f64>() / fps.len() as f64, fps.len()))
        }
    }

    fn format_text_report(run: &StoredRun) -> String {
        let mut output = String::new();

        writeln!(output, "\n{:=^70}", " Rendering Test Report ").unwrap();
        writeln!(output).unwrap();

        writeln!(output, "Suite: {}", run.suite).unwrap();
        writeln!(output, "Run ID: {}", run.id).unwrap();
        writeln!(output, "CPU: {}", run.cpu).unwrap();
        if !run.engine.is_empty() {
            writeln!(output, "Engine: {}", run.engine).unwrap();
        }
        writeln!(output, "Started: {}", format_datetime(&run.started_at)).unwrap();
        writeln!(output, "Completed: {}", format_datetime(&run.completed_at)).unwrap();
        writeln!(
            output,
            "Platform: {}/{} (v{})",
            run.environment.os, run.environment.arch, run.environment.tool_version
        )
        .unwrap();
        writeln!(output).unwrap();

        writeln!(output, "{:-^70}", " Results ").unwrap();
        writeln!(
            output,
            "{:<24} {:<12} {:<16} {:>8} {:>6}",
            "Test", "Renderer", "Scene", "FPS", "Delta"
        )
        .unwrap();
        writeln!(output, "{:-<70}", "").unwrap();

        let deltas = Self::deltas(&run.entries);
        for (i, (entry, delta)) in run.entries.iter().zip(&deltas).enumerate() {
            let fps = if entry.result.passed {
                format!("{:.1}", entry.result.average_fps)
            } else {
                "FAILED".to_string()
            };
            writeln!(
                output,
                "{:<24} {:<12} {:<16} {:>8} {:>6}",
                truncate(&entry.label, 24),
                entry.config.renderer.name(),
                entry.config.scene.name(),
                fps,
                format_delta(i, *delta)
            )
            .unwrap();
        }

        let failures: Vec<&StoredEntry> = run.entries.iter().filter(|e| !e.result.passed).collect();
        if !failures.is_empty() {
            writeln!(output, "\n{:-^70}", " Failures ").unwrap();
            for entry in failures {
                writeln!(output, "{}: {}", entry.label, entry.result.error_message).unwrap();
            }
        }

        writeln!(output, "{:-<70}", "").unwrap();
        match Self::average_score(&run.entries) {
            Some((score, passed)) => writeln!(
                output,
                "Average Score: {:.1} FPS ({}/{} passed)",
                score,
                passed,
                run.entries.len()
            )
            .unwrap(),
            None => writeln!(output, "Average Score: n/a (no passing tests)").unwrap(),
        }

        writeln!(output, "{:=^70}", "").unwrap();
        output
    }

    fn format_markdown_report(run: &StoredRun) -> String {
        let mut output = String::new();

        writeln!(output, "# Rendering Test Report\n").unwrap();
        writeln!(output, "## Summary\n").unwrap();
        writeln!(output, "| Property | Value |").unwrap();
        writeln!(output, "|----------|-------|").unwrap();
        writeln!(output, "| Suite | {} |", run.suite).unwrap();
        writeln!(output, "| Run ID | `{}` |", run.id).unwrap();
        writeln!(output, "| CPU | {} |", run.cpu).unwrap();
        writeln!(output, "| Started | {} |", format_datetime(&run.started_at)).unwrap();
        writeln!(
            output,
            "| Completed | {} |",
            format_datetime(&run.completed_at)
        )
        .unwrap();
        if let Some((score, passed)) = Self::average_score(&run.entries) {
            writeln!(output, "| Average Score | {score:.1} FPS |").unwrap();
            writeln!(output, "| Passed | {}/{} |", passed, run.entries.len()).unwrap();
        }

        writeln!(output, "\n## Results\n").unwrap();
        writeln!(
            output,
            "| Test | Renderer | Scene | Resolution | FPS | Delta |"
        )
        .unwrap();
        writeln!(
            output,
            "|------|----------|-------|------------|-----|-------|"
        )
        .unwrap();

        let deltas = Self::deltas(&run.entries);
        for (i, (entry, delta)) in run.entries.iter().zip(&deltas).enumerate() {
            let fps = if entry.result.passed {
                format!("{:.1}", entry.result.average_fps)
            } else {
                format!("❌ {}", entry.result.error_message)
            };
            writeln!(
                output,
                "| {} | {} | {} | {}x{} | {} | {} |",
                entry.label,
                entry.config.renderer.name(),
                entry.config.scene.name(),
                entry.config.width,
                entry.config.height,
                fps,
                format_delta(i, *delta)
            )
            .unwrap();
        }

        output
    }
}

/// Report output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Markdown => "md",
        }
    }
}

fn format_delta(index: usize, delta: Option<f64>) -> String {
    match delta {
        _ if index == 0 => "base".to_string(),
        Some(d) => format!("{d:+.1}%"),
        None => "-".to_string(),
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RendererType, TestConfig, TestResult};

    fn run() -> StoredRun {
        let gl = TestConfig::performance_preset().with_renderer(RendererType::OpenGl45);
        let vk = gl.clone().with_renderer(RendererType::Vulkan12);
        let mut run = StoredRun::new("vulkan-vs-opengl", "Test CPU");
        run.add_entry("OpenGL 4.5", &gl, &TestResult::pass(0, 200.0));
        run.add_entry("Vulkan 1.2", &vk, &TestResult::pass(0, 250.0));
        run.add_entry("Vulkan 1.2 again", &vk, &TestResult::fail(Some(0), "TIMEOUT"));
        run
    }

    #[test]
    fn test_delta_percent() {
        assert_eq!(ReportGenerator::delta_percent(200.0, 250.0), Some(25.0));
        assert_eq!(ReportGenerator::delta_percent(200.0, 150.0), Some(-25.0));
        assert_eq!(ReportGenerator::delta_percent(0.0, 150.0), None);
    }

    #[test]
    fn test_deltas_against_first_entry() {
        let deltas = ReportGenerator::deltas(&run().entries);
        assert_eq!(deltas, vec![Some(0.0), Some(25.0), None]);
    }

    #[test]
    fn test_deltas_with_failed_base() {
        let mut run = run();
        run.entries[0].result = TestResult::fail(Some(0), "DEVICE_LOST");
        let deltas = ReportGenerator::deltas(&run.entries);
        assert!(deltas.iter().all(Option::is_none));
    }

    #[test]
    fn test_average_score() {
        let (score, passed) = ReportGenerator::average_score(&run().entries).unwrap();
        assert!((score - 225.0).abs() < 1e-9);
        assert_eq!(passed, 2);
        assert!(ReportGenerator::average_score(&[]).is_none());
    }

    #[test]
    fn test_text_report() {
        let report = ReportGenerator::run_report(&run(), ReportFormat::Text);
        assert!(report.contains("Rendering Test Report"));
        assert!(report.contains("+25.0%"));
        assert!(report.contains("FAILED"));
        assert!(report.contains("Vulkan 1.2 again: TIMEOUT"));
        assert!(report.contains("Average Score: 225.0 FPS (2/3 passed)"));
    }

    #[test]
    fn test_markdown_report() {
        let report = ReportGenerator::run_report(&run(), ReportFormat::Markdown);
        assert!(report.starts_with("# Rendering Test Report"));
        assert!(report.contains("| Average Score | 225.0 FPS |"));
        assert!(report.contains("| OpenGL 4.5 | OpenGL 4.5 | Many Cubes | 1920x1080 | 200.0 | base |"));
    }

    #[test]
    fn test_report_format() {
        assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
        assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
        assert!(ReportFormat::from_str("html").is_none());
        assert_eq!(ReportFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }
}
