//! Results storage and retrieval
//!
//! Provides persistent storage for test runs in JSON format.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{TestConfig, TestResult, TestRunSummary};

/// Stored test run containing all results
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredRun {
    /// Unique run ID
    pub id: String,

    /// Suite name, or "adhoc" for single runs
    pub suite: String,

    /// Timestamp when the run started
    pub started_at: DateTime<Utc>,

    /// Timestamp when the run completed
    pub completed_at: DateTime<Utc>,

    /// Processor specification reported by the engine
    pub cpu: String,

    /// Engine module location
    pub engine: String,

    /// Results in execution order
    pub entries: Vec<StoredEntry>,

    /// Aggregate statistics
    pub aggregate: Option<AggregateStats>,

    /// Environment info
    pub environment: EnvironmentInfo,
}

/// One executed test
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredEntry {
    pub label: String,
    pub config: TestConfig,
    pub result: TestResult,
}

/// Aggregate statistics over a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Pass rate (0.0 - 1.0)
    pub pass_rate: f64,

    /// Average FPS over passing entries
    pub avg_fps: Option<f64>,
    pub min_fps: Option<f64>,
    pub max_fps: Option<f64>,

    /// Wall clock duration of the run
    pub total_duration_ms: u64,
}

/// Environment information
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Operating system
    pub os: String,

    /// Architecture
    pub arch: String,

    /// Tool version
    pub tool_version: String,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StoredRun {
    /// Create a new stored run
    pub fn new(suite: impl Into<String>, cpu: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_run_id(),
            suite: suite.into(),
            started_at: now,
            completed_at: now,
            cpu: cpu.into(),
            engine: String::new(),
            entries: Vec::new(),
            aggregate: None,
            environment: EnvironmentInfo::default(),
        }
    }

    /// Set when the run began, for runs recorded after the tests finished
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self.completed_at = self.completed_at.max(started_at);
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Record a result
    pub fn add_entry(&mut self, label: impl Into<String>, config: &TestConfig, result: &TestResult) {
        self.entries.push(StoredEntry {
            label: label.into(),
            config: config.clone(),
            result: result.clone(),
        });
        self.completed_at = Utc::now();
    }

    /// Summary over the stored results
    pub fn summary(&self) -> TestRunSummary {
        TestRunSummary::new(
            self.suite.clone(),
            self.entries.iter().map(|e| e.result.clone()).collect(),
        )
    }

    /// Calculate aggregate statistics
    pub fn calculate_aggregate(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        let summary = self.summary();
        let total_duration_ms = (self.completed_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;

        self.aggregate = Some(AggregateStats {
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            pass_rate: summary.pass_rate() / 100.0,
            avg_fps: summary.average_fps,
            min_fps: summary.min_fps,
            max_fps: summary.max_fps,
            total_duration_ms,
        });
    }
}

/// Generate unique run ID
fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Directory name for a suite
fn suite_dir_name(suite: &str) -> String {
    suite
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

/// Results storage manager
pub struct ResultsStorage {
    /// Base directory for results
    base_dir: PathBuf,
}

impl ResultsStorage {
    /// Create a new results storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create with default directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("render-tester")
            .join("results");
        Self::new(base_dir)
    }

    /// Storage at `dir`, or the default directory
    pub fn at(dir: Option<PathBuf>) -> Self {
        dir.map(Self::new).unwrap_or_else(Self::default_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get path for a suite's results
    fn suite_dir(&self, suite: &str) -> PathBuf {
        self.base_dir.join(suite_dir_name(suite))
    }

    /// Get path for a specific run
    fn run_path(&self, suite: &str, run_id: &str) -> PathBuf {
        self.suite_dir(suite).join(format!("{run_id}.json"))
    }

    /// Save a run
    pub fn save(&self, run: &StoredRun) -> Result<PathBuf> {
        let suite_dir = self.suite_dir(&run.suite);
        fs::create_dir_all(&suite_dir)
            .with_context(|| format!("Failed to create directory: {}", suite_dir.display()))?;

        let path = self.run_path(&run.suite, &run.id);
        let file = File::create(&path).context("Failed to create results file")?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, run).context("Failed to write results")?;

        info!("Saved test results to {}", path.display());
        Ok(path)
    }

    /// Load a run
    pub fn load(&self, suite: &str, run_id: &str) -> Result<StoredRun> {
        let path = self.run_path(suite, run_id);
        let run = self
            .load_from_path(&path)
            .with_context(|| format!("Run {run_id} not found in suite {suite}"))?;

        debug!("Loaded test results from {}", path.display());
        Ok(run)
    }

    /// Find a run by ID in any suite
    pub fn find(&self, run_id: &str) -> Result<Option<StoredRun>> {
        for suite in self.list_suites()? {
            let path = self.run_path(&suite, run_id);
            if path.exists() {
                return self.load_from_path(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Load all runs for a suite, newest first
    pub fn load_suite(&self, suite: &str) -> Result<Vec<StoredRun>> {
        let suite_dir = self.suite_dir(suite);
        if !suite_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&suite_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_path(&path) {
                    Ok(run) => runs.push(run),
                    Err(e) => {
                        debug!("Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }

    /// Load from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<StoredRun> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open results file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Failed to parse results")
    }

    /// List all suites with results
    pub fn list_suites(&self) -> Result<Vec<String>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut suites = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    suites.push(name.to_string());
                }
            }
        }

        suites.sort();
        Ok(suites)
    }

    /// List all runs for a suite, newest first
    pub fn list_runs(&self, suite: &str) -> Result<Vec<RunInfo>> {
        Ok(self
            .load_suite(suite)?
            .into_iter()
            .map(|run| RunInfo::from(&run))
            .collect())
    }

    /// Get latest run for a suite
    pub fn latest(&self, suite: &str) -> Result<Option<StoredRun>> {
        let runs = self.load_suite(suite)?;
        Ok(runs.into_iter().next())
    }

    /// Delete a run
    pub fn delete(&self, suite: &str, run_id: &str) -> Result<bool> {
        let path = self.run_path(suite, run_id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
            info!("Deleted results: {}", path.display());
            return Ok(true);
        }
        Ok(false)
    }

    /// Delete all runs for a suite
    pub fn delete_suite(&self, suite: &str) -> Result<()> {
        let suite_dir = self.suite_dir(suite);
        if suite_dir.exists() {
            fs::remove_dir_all(&suite_dir)?;
            info!("Deleted all results for suite: {suite}");
        }
        Ok(())
    }

    /// Export run to a file
    pub fn export(&self, run: &StoredRun, path: &Path, format: ExportFormat) -> Result<()> {
        match format {
            ExportFormat::Json => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                let writer = BufWriter::new(file);
                serde_json::to_writer_pretty(writer, run)?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;

                writer.write_record([
                    "label",
                    "renderer",
                    "scene",
                    "width",
                    "height",
                    "duration_secs",
                    "passed",
                    "test_index",
                    "average_fps",
                    "error",
                ])?;

                for entry in &run.entries {
                    writer.write_record([
                        entry.label.clone(),
                        entry.config.renderer.key().to_string(),
                        entry.config.scene.key().to_string(),
                        entry.config.width.to_string(),
                        entry.config.height.to_string(),
                        entry.config.duration_secs.to_string(),
                        entry.result.passed.to_string(),
                        entry
                            .result
                            .test_index
                            .map(|i| i.to_string())
                            .unwrap_or_default(),
                        format!("{:.2}", entry.result.average_fps),
                        entry.result.error_message.clone(),
                    ])?;
                }
                writer.flush()?;
            }
        }

        info!("Exported results to {}", path.display());
        Ok(())
    }
}

/// Brief run information
#[derive(Clone, Debug)]
pub struct RunInfo {
    pub id: String,
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub entries: usize,
    pub pass_rate: f64,
    pub avg_fps: Option<f64>,
}

impl From<&StoredRun> for RunInfo {
    fn from(run: &StoredRun) -> Self {
        Self {
            id: run.id.clone(),
            suite: run.suite.clone(),
            started_at: run.started_at,
            entries: run.entries.len(),
            pass_rate: run.aggregate.as_ref().map(|a| a.pass_rate).unwrap_or(0.0),
            avg_fps: run.aggregate.as_ref().and_then(|a| a.avg_fps),
        }
    }
}

/// Export format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str)
    }
}
