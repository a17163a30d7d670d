//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::suite::{SuiteEntry, TestSuite};
use super::AppConfig;
use crate::models::{RendererType, SceneType, TestConfig};
use crate::payload::DisplayMode;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./render-tester.yaml",
    "./render-tester.yml",
    "./.render-tester.yaml",
    "~/.config/render-tester/config.yaml",
];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Full configuration file structure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Application settings
    #[serde(default)]
    pub app: AppConfig,

    /// Test suites, added to the built-in ones
    #[serde(default)]
    pub suites: Vec<TestSuite>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            suites: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from `path` when given, otherwise from the first standard
    /// location that exists, otherwise defaults
    pub fn resolve(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match path.map(Path::to_path_buf).or_else(Self::find) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        let mut names = HashSet::new();
        for suite in &self.suites {
            if suite.name.trim().is_empty() {
                anyhow::bail!("Suite name must not be empty");
            }
            if !names.insert(suite.name.as_str()) {
                anyhow::bail!("Duplicate suite name '{}'", suite.name);
            }
            for entry in &suite.entries {
                entry.config.validate().with_context(|| {
                    format!("Invalid entry '{}' in suite '{}'", entry.label, suite.name)
                })?;
            }
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: default_version(),
            app: AppConfig {
                engine_dir: Some("~/glview".to_string()),
                display_modes: vec![DisplayMode::new(1920, 1080), DisplayMode::new(2560, 1440)],
                ..AppConfig::default()
            },
            suites: vec![TestSuite {
                name: "nightly".to_string(),
                description: "Nightly regression run".to_string(),
                entries: vec![
                    SuiteEntry::new(
                        "GL 4.6 cubes",
                        TestConfig::default_preset().with_scene(SceneType::ManyCubes),
                    ),
                    SuiteEntry::new(
                        "Vulkan 1.2 characters",
                        TestConfig::quality_preset()
                            .with_renderer(RendererType::Vulkan12)
                            .with_scene(SceneType::ManyCharacters),
                    ),
                ],
            }],
        }
    }

    /// JSON Schema describing the configuration file
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).context("Failed to serialize config schema")
    }
}

/// Expand ~ to home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
