//! Output formatters for test results
//!
//! Provides JSON, Table, CSV and summary output formats.

use serde::Serialize;
use std::io::Write;

use crate::engine::CpuInfo;
use crate::models::{TestResult, TestRunSummary};
use crate::results::RunInfo;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }

    fn status(&self, result: &TestResult) -> &'static str {
        match (result.passed, self.colorize) {
            (true, true) => "\x1b[32m✓ PASS\x1b[0m",
            (false, true) => "\x1b[31m✗ FAIL\x1b[0m",
            (true, false) => "✓ PASS",
            (false, false) => "✗ FAIL",
        }
    }

    /// Format a single test result
    pub fn format_result(&self, label: &str, result: &TestResult) -> String {
        match self.format {
            OutputFormat::Table => self.format_result_table(label, result),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(result),
            OutputFormat::Csv => self
                .to_csv(std::iter::once((label.to_string(), result)))
                .trim_end()
                .to_string(),
            OutputFormat::Summary => format!("{label}: {result}"),
        }
    }

    fn format_result_table(&self, label: &str, result: &TestResult) -> String {
        let detail = if result.passed {
            format!("{:>10.2} FPS", result.average_fps)
        } else {
            result.error_message.clone()
        };
        format!("{:28} {} {}", truncate(label, 28), self.status(result), detail)
    }

    fn to_csv<'a>(&self, rows: impl Iterator<Item = (String, &'a TestResult)>) -> String {
        let write = || -> Result<Vec<u8>, Box<dyn std::error::Error>> {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(CSV_HEADER.split(','))?;
            for (label, result) in rows {
                writer.write_record([
                    label,
                    result.passed.to_string(),
                    result
                        .test_index
                        .map(|i| i.to_string())
                        .unwrap_or_default(),
                    format!("{:.2}", result.average_fps),
                    result.error_message.clone(),
                ])?;
            }
            Ok(writer.into_inner().map_err(|e| e.into_error())?)
        };
        write()
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_default()
    }

    /// Format a batch of results. `labels` are matched to results by position.
    pub fn format_summary(&self, summary: &TestRunSummary, labels: &[String]) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary, labels),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(summary),
            OutputFormat::Csv => self.format_summary_csv(summary, labels),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &TestRunSummary, labels: &[String]) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!("║  {:60}║\n", truncate(&summary.name, 58)));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for (i, result) in summary.results.iter().enumerate() {
            let label = label_at(labels, i);
            output.push_str(&format!("║  {}\n", self.format_result_table(&label, result)));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.passed)
        } else {
            summary.passed.to_string()
        };
        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Total: {:2} | Pass: {} | Fail: {} | Pass Rate: {:5.1}%\n",
            summary.total,
            pass_str,
            fail_str,
            summary.pass_rate()
        ));
        if let (Some(avg), Some(min), Some(max)) =
            (summary.average_fps, summary.min_fps, summary.max_fps)
        {
            output.push_str(&format!(
                "║  FPS avg {avg:.1} | min {min:.1} | max {max:.1}\n"
            ));
        }
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_summary_csv(&self, summary: &TestRunSummary, labels: &[String]) -> String {
        self.to_csv(
            summary
                .results
                .iter()
                .enumerate()
                .map(|(i, result)| (label_at(labels, i), result)),
        )
    }

    fn format_summary_brief(&self, summary: &TestRunSummary) -> String {
        let fps = summary
            .average_fps
            .map(|f| format!(", average {f:.1} FPS"))
            .unwrap_or_default();
        format!(
            "{}: {}/{} passed ({:.1}%){}",
            summary.name,
            summary.passed,
            summary.total,
            summary.pass_rate(),
            fps
        )
    }

    /// Format stored run listings
    pub fn format_runs(&self, runs: &[RunInfo]) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => {
                #[derive(Serialize)]
                struct RunJson<'a> {
                    id: &'a str,
                    suite: &'a str,
                    started_at: String,
                    entries: usize,
                    pass_rate: f64,
                    avg_fps: Option<f64>,
                }

                let json: Vec<RunJson> = runs
                    .iter()
                    .map(|r| RunJson {
                        id: &r.id,
                        suite: &r.suite,
                        started_at: r.started_at.to_rfc3339(),
                        entries: r.entries,
                        pass_rate: r.pass_rate,
                        avg_fps: r.avg_fps,
                    })
                    .collect();
                self.to_json(&json)
            }
            _ => {
                let mut output = String::new();
                output.push_str(&format!(
                    "{:<22} {:<20} {:<20} {:>7} {:>7} {:>9}\n",
                    "ID", "Suite", "Started", "Tests", "Pass%", "Avg FPS"
                ));
                output.push_str(&format!("{:─<90}\n", ""));
                for run in runs {
                    output.push_str(&format!(
                        "{:<22} {:<20} {:<20} {:>7} {:>6.1}% {:>9}\n",
                        run.id,
                        truncate(&run.suite, 20),
                        run.started_at.format("%Y-%m-%d %H:%M:%S"),
                        run.entries,
                        run.pass_rate * 100.0,
                        run.avg_fps
                            .map(|f| format!("{f:.1}"))
                            .unwrap_or_else(|| "-".to_string())
                    ));
                }
                output
            }
        }
    }

    /// Format processor information
    pub fn format_cpu(&self, cpu: &CpuInfo) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(cpu),
            _ => {
                let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
                let mut output = String::new();
                output.push_str(&format!("Specification: {}\n", text(&cpu.specification)));
                output.push_str(&format!("Name:          {}\n", text(&cpu.name)));
                output.push_str(&format!("Vendor:        {}\n", text(&cpu.vendor_name)));
                output.push_str(&format!("Code name:     {}\n", text(&cpu.code_name)));
                output.push_str(&format!("Package:       {}\n", text(&cpu.package)));
                output.push_str(&format!("Technology:    {}\n", text(&cpu.technology)));
                output.push_str(&format!(
                    "Cores/Threads: {}/{}\n",
                    cpu.cores, cpu.threads
                ));
                output.push_str(&format!(
                    "Family/Model:  {}/{} (stepping {})\n",
                    cpu.family, cpu.model, cpu.stepping
                ));
                output.push_str(&format!("Instructions:  {}\n", text(&cpu.instructions)));
                output
            }
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

const CSV_HEADER: &str = "label,passed,test_index,average_fps,error";

fn label_at(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("Test {}", index + 1))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

/// Write results to a file
pub fn write_results_to_file(
    path: &str,
    summary: &TestRunSummary,
    labels: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary, labels);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
